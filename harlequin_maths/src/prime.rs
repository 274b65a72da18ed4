//! Random generation of primes from a fixed bounded range.

use rand::{CryptoRng, Rng, RngCore};

use crate::prime_test::{PrimeTest, TrialDivision};

/// Lower bound (inclusive) of the prime search range. Candidates below this are never drawn, so
/// the primality test never sees the degenerate inputs 0 through 4.
pub const LOWER_PRIME_BOUND: u64 = 5;

/// Upper bound (exclusive) of the prime search range. The range width is the largest value
/// representable in 16 bits, which keeps the product of two primes well within `u64` and bounds
/// the CRT sub-exponents used during decryption.
pub const UPPER_PRIME_BOUND: u64 = 65_535 + LOWER_PRIME_BOUND;

/// This trait defines a function to randomly generate a prime number from the system's search
/// range.
pub trait PrimeGenerator {
    /// Generate a random prime. It is assumed that `rng` is well-seeded; the method may invoke it
    /// an unbounded number of times until a candidate passes the primality test.
    fn generate_random_prime<R>(rng: &mut R) -> u64
    where
        R: RngCore + CryptoRng;
}

/// Rejection sampling over uniform candidates in `[LOWER_PRIME_BOUND, UPPER_PRIME_BOUND)`,
/// accepting the first candidate `TrialDivision` approves. This blocks until a prime is found,
/// which is expected to happen quickly for the 16-bit range.
pub struct BoundedPrimeGenerator;

impl PrimeGenerator for BoundedPrimeGenerator {
    fn generate_random_prime<R>(rng: &mut R) -> u64
    where
        R: RngCore + CryptoRng,
    {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let candidate = rng.gen_range(LOWER_PRIME_BOUND, UPPER_PRIME_BOUND);
            if TrialDivision::is_prime(&candidate) {
                tracing::trace!(candidate, attempts, "prime candidate accepted");
                return candidate;
            }
        }
    }
}
