//! Interactive RSA demonstrator. Generates a toy keypair, encrypts one line read from standard
//! input character by character and decrypts it back via the Chinese Remainder Theorem, printing
//! every intermediate arithmetic step along the way.

use std::io::{self, Write};
use std::process;

use harlequin_encryption::rsa::{
    message_prefix, CrtDecryptor, RsaCryptoSystem, RsaKeypair, MAX_MESSAGE_LENGTH,
};
use harlequin_encryption::AsymmetricalEncryptionScheme;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Failures that abort the demonstration run.
#[derive(Debug, Error)]
enum CliError {
    #[error("error reading input: the input stream closed before a message was entered")]
    InputClosed,

    #[error("error reading input: {0}")]
    InputRead(#[from] io::Error),

    #[error(
        "the message exceeds the maximum length of {} characters",
        MAX_MESSAGE_LENGTH
    )]
    InputTooLong,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(error) = run() {
        eprintln!("{}", error);
        process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let mut rng = rand::thread_rng();

    println!("========================================");
    println!("   Interactive RSA Encryption System");
    println!("========================================");
    println!();

    println!("Step 1: Generating RSA Keys...");
    println!("-------------------------------");
    let keypair = RsaKeypair::generate(&mut rng);
    println!("Using e = {}", keypair.e);
    println!("Generated prime numbers:");
    println!("  p = {}", keypair.p);
    println!("  q = {}", keypair.q);
    println!("  n = p * q = {}", keypair.n);
    println!("  phi(n) = (p-1)*(q-1) = {}", keypair.phi);
    println!("  d = {} (modular inverse of e mod phi)", keypair.d);
    println!();
    println!("Public Key:  (n={}, e={})", keypair.n, keypair.e);
    println!("Private Key: (n={}, d={})", keypair.n, keypair.d);
    println!();

    println!("========================================");
    println!("Step 2: Enter Text to Encrypt");
    println!("-------------------------------");
    print!("Enter your message: ");
    io::stdout().flush()?;

    let message = read_message()?;
    println!();
    println!("Original message: \"{}\"", message);

    println!();
    println!("========================================");
    println!("Step 3: Encryption");
    println!("========================================");
    println!();
    println!("--- Encryption Process ---");
    println!("Encrypting each character:");
    let public_key = keypair.public_key();
    let ciphertext = RsaCryptoSystem::encrypt_message(&public_key, message.as_bytes());
    let consumed = message_prefix(message.as_bytes());
    for (&byte, &value) in consumed.iter().zip(&ciphertext) {
        println!(
            "  '{}' (ASCII {}) -> c = {}^{} mod {} = {}",
            byte as char, byte, byte, keypair.e, keypair.n, value
        );
    }
    println!();
    print!("Ciphertext values: ");
    for value in &ciphertext {
        print!("{} ", value);
    }
    println!();

    println!();
    println!("========================================");
    println!("Step 4: Decryption");
    println!("========================================");
    println!();
    println!("--- Decryption Process ---");
    println!("Using Chinese Remainder Theorem (CRT):");
    let decryptor = CrtDecryptor::new(&keypair.private_key());
    println!(
        "  dP = d mod (p-1) = {} mod {} = {}",
        keypair.d,
        decryptor.p - 1,
        decryptor.d_p
    );
    println!(
        "  dQ = d mod (q-1) = {} mod {} = {}",
        keypair.d,
        decryptor.q - 1,
        decryptor.d_q
    );
    println!(
        "  qInv = inverse(q, p) = inverse({}, {}) = {}",
        decryptor.q, decryptor.p, decryptor.q_inv
    );
    println!();
    println!("Decrypting each ciphertext value:");
    let mut decrypted = Vec::with_capacity(ciphertext.len());
    for &value in &ciphertext {
        let step = decryptor.decrypt_value(value);
        println!(
            "  c={} -> m1={}, m2={}, h={} -> m={} -> '{}'",
            value,
            step.m1,
            step.m2,
            step.h,
            step.m,
            step.byte() as char
        );
        decrypted.push(step.byte());
    }

    println!();
    println!("========================================");
    println!("Results");
    println!("========================================");
    println!("Original message:  \"{}\"", message);
    println!("Decrypted message: \"{}\"", String::from_utf8_lossy(&decrypted));
    println!();
    if consumed == &decrypted[..] {
        println!("SUCCESS: Decryption matches original!");
    } else {
        println!("ERROR: Decryption does not match original!");
    }
    println!("========================================");

    Ok(())
}

/// Reads one line from standard input, strips the line terminator and enforces the maximum
/// message length. An immediate end of input counts as a read failure.
fn read_message() -> Result<String, CliError> {
    let mut line = String::new();
    let bytes_read = io::stdin().read_line(&mut line)?;
    if bytes_read == 0 {
        return Err(CliError::InputClosed);
    }

    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }

    if line.len() > MAX_MESSAGE_LENGTH {
        return Err(CliError::InputTooLong);
    }

    Ok(line)
}
