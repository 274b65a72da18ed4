//! A crate containing utility functions and traits for the number-theoretic algorithms used in
//! small-integer RSA: primality testing, bounded prime generation, modular exponentiation and
//! modular inversion.

pub mod modular;
pub mod prime;
pub mod prime_test;
