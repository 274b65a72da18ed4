//! Textbook RSA over small integers with CRT decryption. Key sizes are toy-scale and encryption
//! is deterministic per character, so this is an educational scheme, not a secure one.

use harlequin_maths::modular::{mod_inverse, mod_pow};
use harlequin_maths::prime::{BoundedPrimeGenerator, PrimeGenerator};
use num::integer::gcd;
use rand::{CryptoRng, RngCore};

use crate::AsymmetricalEncryptionScheme;

/// The fixed public exponent of every generated keypair.
pub const PUBLIC_EXPONENT: u64 = 3;

/// Maximum number of message bytes a single encryption call consumes.
pub const MAX_MESSAGE_LENGTH: usize = 1024;

/// Marker type implementing [`AsymmetricalEncryptionScheme`] for this RSA variant.
pub struct RsaCryptoSystem;

pub struct RsaPrivateKey {
    pub d: u64,
    pub n: u64,
    pub p: u64,
    pub q: u64,
}

pub struct RsaPublicKey {
    pub e: u64,
    pub n: u64,
}

/// A complete keypair including the generation parameters. The private and public key views are
/// derived from it; the remaining fields exist so a caller can display how the keypair came to
/// be. Immutable once generated.
pub struct RsaKeypair {
    pub p: u64,
    pub q: u64,
    pub n: u64,
    pub phi: u64,
    pub e: u64,
    pub d: u64,
}

impl RsaKeypair {
    /// Draw prime pairs until one admits the fixed public exponent, then derive the private
    /// exponent. The primes are redrawn whenever they collide or whenever `gcd(e, phi) != 1`,
    /// so this blocks until a valid pair is found. `phi` is computed as `n - p - q + 1`, which
    /// equals `(p - 1) * (q - 1)`.
    pub fn generate<R>(rng: &mut R) -> Self
    where
        R: RngCore + CryptoRng,
    {
        let e = PUBLIC_EXPONENT;
        loop {
            let p = BoundedPrimeGenerator::generate_random_prime(rng);
            let mut q = BoundedPrimeGenerator::generate_random_prime(rng);
            while q == p {
                q = BoundedPrimeGenerator::generate_random_prime(rng);
            }

            let n = p * q;
            let phi = n - p - q + 1;
            if gcd(e, phi) != 1 {
                tracing::trace!(p, q, phi, "discarding prime pair, phi shares a factor with e");
                continue;
            }

            let d = mod_inverse(e, phi);
            return RsaKeypair { p, q, n, phi, e, d };
        }
    }

    pub fn public_key(&self) -> RsaPublicKey {
        RsaPublicKey {
            e: self.e,
            n: self.n,
        }
    }

    pub fn private_key(&self) -> RsaPrivateKey {
        RsaPrivateKey {
            d: self.d,
            n: self.n,
            p: self.p,
            q: self.q,
        }
    }
}

/// Returns the prefix of `message` that encryption consumes: everything before the first NUL or
/// newline byte, or the whole message if neither occurs.
pub fn message_prefix(message: &[u8]) -> &[u8] {
    let end = message
        .iter()
        .position(|&byte| byte == 0 || byte == b'\n')
        .unwrap_or(message.len());
    &message[..end]
}

/// Per-run CRT state, derived once from a private key. The prime roles are normalised so that
/// `p > q`, which keeps `m1 - m2` within `(-p, p)` during reconstruction and thereby makes a
/// single correction by `p` sufficient.
pub struct CrtDecryptor {
    pub p: u64,
    pub q: u64,
    pub d_p: u64,
    pub d_q: u64,
    pub q_inv: u64,
}

/// The intermediate quantities of a single CRT reconstruction: the two partial exponentiations,
/// the recombination term and the recovered residue.
pub struct CrtStep {
    pub m1: u64,
    pub m2: u64,
    pub h: u64,
    pub m: u64,
}

impl CrtStep {
    /// The recovered residue interpreted as a plaintext byte.
    pub fn byte(&self) -> u8 {
        self.m as u8
    }
}

impl CrtDecryptor {
    pub fn new(key: &RsaPrivateKey) -> Self {
        let (p, q) = if key.p > key.q {
            (key.p, key.q)
        } else {
            (key.q, key.p)
        };

        CrtDecryptor {
            p,
            q,
            d_p: key.d % (p - 1),
            d_q: key.d % (q - 1),
            q_inv: mod_inverse(q, p),
        }
    }

    /// Reconstructs the residue `m` with `c ^ d == m mod n` from the two cheaper sub-
    /// exponentiations modulo `p` and `q`.
    pub fn decrypt_value(&self, cipher: u64) -> CrtStep {
        let m1 = mod_pow(cipher, self.d_p, self.p);
        let m2 = mod_pow(cipher, self.d_q, self.q);

        // m2 < q < p, so one correction keeps the difference in [0, p)
        let difference = if m1 >= m2 {
            m1 - m2
        } else {
            m1 + self.p - m2
        };

        let h = self.q_inv * difference % self.p;
        let m = m2 + h * self.q;
        CrtStep { m1, m2, h, m }
    }
}

impl AsymmetricalEncryptionScheme for RsaCryptoSystem {
    type PrivateKey = RsaPrivateKey;
    type PublicKey = RsaPublicKey;
    type Ciphertext = Vec<u64>;

    fn generate_keypair<R>(rng: &mut R) -> (Self::PrivateKey, Self::PublicKey)
    where
        R: RngCore + CryptoRng,
    {
        let keypair = RsaKeypair::generate(rng);
        (keypair.private_key(), keypair.public_key())
    }

    /// Encrypts each byte of the consumed message prefix separately as `byte ^ e mod n`. The
    /// resulting sequence is parallel-indexed to the consumed prefix.
    ///
    /// # Panics
    /// Panics if the consumed prefix exceeds [`MAX_MESSAGE_LENGTH`] bytes.
    fn encrypt_message(key: &Self::PublicKey, message: &[u8]) -> Vec<u64> {
        let prefix = message_prefix(message);
        if prefix.len() > MAX_MESSAGE_LENGTH {
            panic!(
                "message length exceeds the maximum of {} characters",
                MAX_MESSAGE_LENGTH
            );
        }

        prefix
            .iter()
            .map(|&byte| mod_pow(u64::from(byte), key.e, key.n))
            .collect()
    }

    /// Decrypts each residue of the sequence back into one plaintext byte. The output has the
    /// same length as the input sequence.
    fn decrypt_message(key: &Self::PrivateKey, cipher: &Self::Ciphertext) -> Vec<u8> {
        let decryptor = CrtDecryptor::new(key);
        cipher
            .iter()
            .map(|&value| decryptor.decrypt_value(value).byte())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use harlequin_maths::prime_test::{PrimeTest, TrialDivision};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    /// A small handmade keypair with n > 255, so every byte value survives the round trip.
    fn fixed_keypair() -> RsaKeypair {
        RsaKeypair {
            p: 23,
            q: 29,
            n: 667,
            phi: 616,
            e: 3,
            d: 411,
        }
    }

    #[test]
    fn test_fixed_keypair_is_consistent() {
        let keypair = fixed_keypair();
        assert_eq!(keypair.n, keypair.p * keypair.q);
        assert_eq!(keypair.phi, keypair.n - keypair.p - keypair.q + 1);
        assert_eq!(keypair.phi, (keypair.p - 1) * (keypair.q - 1));
        assert_eq!(keypair.e * keypair.d % keypair.phi, 1);
    }

    #[test]
    fn test_encrypt_known_values() {
        let keypair = fixed_keypair();
        let cipher = RsaCryptoSystem::encrypt_message(&keypair.public_key(), b"HI");
        assert_eq!(cipher, vec![395, 156]);
    }

    #[test]
    fn test_round_trip_covers_all_byte_values() {
        let keypair = fixed_keypair();
        for byte in 0..=255u8 {
            let cipher = RsaCryptoSystem::encrypt_message(&keypair.public_key(), &[byte]);
            let plain = RsaCryptoSystem::decrypt_message(&keypair.private_key(), &cipher);
            assert_eq!(plain, vec![byte]);
        }
    }

    #[test]
    fn test_crt_intermediate_values() {
        let keypair = fixed_keypair();
        let decryptor = CrtDecryptor::new(&keypair.private_key());
        assert_eq!(decryptor.p, 29);
        assert_eq!(decryptor.q, 23);
        assert_eq!(decryptor.d_p, 19);
        assert_eq!(decryptor.d_q, 15);
        assert_eq!(decryptor.q_inv, 24);

        // 395 is the ciphertext of 'H' under the fixed keypair
        let step = decryptor.decrypt_value(395);
        assert_eq!(step.m1, 14);
        assert_eq!(step.m2, 3);
        assert_eq!(step.h, 3);
        assert_eq!(step.m, 72);
        assert_eq!(step.byte(), b'H');
    }

    #[test]
    fn test_message_prefix_stops_at_newline_or_nul() {
        assert_eq!(message_prefix(b"HI\nrest"), &b"HI"[..]);
        assert_eq!(message_prefix(b"HI\0rest"), &b"HI"[..]);
        assert_eq!(message_prefix(b"\nHI"), &b""[..]);
        assert_eq!(message_prefix(b"HI"), &b"HI"[..]);
    }

    #[test]
    fn test_cipher_length_matches_consumed_prefix() {
        let keypair = fixed_keypair();
        let cipher = RsaCryptoSystem::encrypt_message(&keypair.public_key(), b"HELLO\nWORLD");
        assert_eq!(cipher.len(), 5);
        assert!(RsaCryptoSystem::encrypt_message(&keypair.public_key(), b"").is_empty());
    }

    #[test]
    fn test_encryption_is_deterministic() {
        let keypair = fixed_keypair();
        let first = RsaCryptoSystem::encrypt_message(&keypair.public_key(), b"determinism");
        let second = RsaCryptoSystem::encrypt_message(&keypair.public_key(), b"determinism");
        assert_eq!(first, second);
    }

    #[test]
    #[should_panic]
    fn test_oversized_message_panics() {
        let keypair = fixed_keypair();
        let message = vec![b'A'; MAX_MESSAGE_LENGTH + 1];
        RsaCryptoSystem::encrypt_message(&keypair.public_key(), &message);
    }

    #[test]
    fn test_generated_keypair_invariants() {
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        for _ in 0..4 {
            let keypair = RsaKeypair::generate(&mut rng);
            assert_ne!(keypair.p, keypair.q);
            assert!(TrialDivision::is_prime(&keypair.p));
            assert!(TrialDivision::is_prime(&keypair.q));
            assert_eq!(keypair.n, keypair.p * keypair.q);
            assert_eq!(keypair.phi, (keypair.p - 1) * (keypair.q - 1));
            assert_eq!(gcd(keypair.e, keypair.phi), 1);
            assert_eq!(keypair.e * keypair.d % keypair.phi, 1);
        }
    }

    #[test]
    fn test_generated_keypair_round_trip() {
        let mut rng = StdRng::seed_from_u64(42);
        let keypair = RsaKeypair::generate(&mut rng);
        assert!(keypair.n > 255);

        let message = b"The Magic Words are Squeamish Ossifrage";
        let cipher = RsaCryptoSystem::encrypt_message(&keypair.public_key(), message);
        let plain = RsaCryptoSystem::decrypt_message(&keypair.private_key(), &cipher);
        assert_eq!(plain, message.to_vec());
    }

    #[test]
    fn test_trait_keypair_round_trip() {
        let mut rng = StdRng::seed_from_u64(7);
        let (private_key, public_key) = RsaCryptoSystem::generate_keypair(&mut rng);
        assert_eq!(private_key.n, public_key.n);
        assert_eq!(public_key.e, PUBLIC_EXPONENT);

        let cipher = RsaCryptoSystem::encrypt_message(&public_key, b"HI");
        assert_eq!(
            RsaCryptoSystem::decrypt_message(&private_key, &cipher),
            b"HI".to_vec()
        );
    }
}
