//! A crate containing the small-integer RSA demonstration scheme. The scheme encrypts a message
//! character by character into a sequence of residues and decrypts it back via the Chinese
//! Remainder Theorem; every intermediate quantity of the reconstruction is exposed so a caller
//! can display the arithmetic step by step.

use rand::{CryptoRng, RngCore};

pub mod rsa;

/// A trait representing an asymmetrical encryption scheme. It offers methods for generating a
/// random key pair and encrypting and decrypting messages. No attempts are made to secure the
/// keys, it is the caller's responsibility to properly protect them according to the caller's
/// threat model.
pub trait AsymmetricalEncryptionScheme {
    type PrivateKey;
    type PublicKey;

    /// The encrypted form of a message. Schemes that encrypt unit-wise produce a sequence of
    /// residues rather than a byte string.
    type Ciphertext;

    /// Generate a key pair for this scheme using the provided random generator. It is assumed
    /// that the generator is properly seeded.
    fn generate_keypair<R>(rng: &mut R) -> (Self::PrivateKey, Self::PublicKey)
    where
        R: RngCore + CryptoRng;

    /// Encrypt a message using the provided public key.
    fn encrypt_message(key: &Self::PublicKey, message: &[u8]) -> Self::Ciphertext;

    /// Decrypt a cipher text using the provided private key. The clear text is returned as raw
    /// bytes.
    fn decrypt_message(key: &Self::PrivateKey, cipher: &Self::Ciphertext) -> Vec<u8>;
}
