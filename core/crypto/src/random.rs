//! Secure random values backed by the operating system CSPRNG.

use std::ops::Range;

use rand::rngs::OsRng;
use rand::distributions::uniform::SampleUniform;
use rand::{Rng, RngCore};

use cryptkit_common::codec::{bytes_to_base64, bytes_to_hex};

/// Fill `buffer` with secure random bytes.
pub fn fill_random_bytes(buffer: &mut [u8]) {
    OsRng.fill_bytes(buffer);
}

/// Allocate `length` secure random bytes.
pub fn random_bytes(length: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; length];
    fill_random_bytes(&mut bytes);
    bytes
}

/// Uniform value in the half-open `range`.
///
/// # Panics
/// Panics if the range is empty; callers validate their ranges first.
pub fn random_in_range<T>(range: Range<T>) -> T
where
    T: SampleUniform + PartialOrd,
{
    OsRng.gen_range(range)
}

/// Random key of `byte_length` bytes as upper-case hex.
pub fn generate_hex_key(byte_length: usize) -> String {
    bytes_to_hex(&random_bytes(byte_length))
}

/// Random key of `byte_length` bytes as Base64.
pub fn generate_base64_key(byte_length: usize) -> String {
    bytes_to_base64(&random_bytes(byte_length))
}

/// 128-bit random key as hex.
pub fn generate_128_bit_key() -> String {
    generate_hex_key(16)
}

/// 192-bit random key as hex.
pub fn generate_192_bit_key() -> String {
    generate_hex_key(24)
}

/// 256-bit random key as hex.
pub fn generate_256_bit_key() -> String {
    generate_hex_key(32)
}

/// 512-bit random key as hex.
pub fn generate_512_bit_key() -> String {
    generate_hex_key(64)
}

/// Non-negative random 64-bit number drawn from `byte_length` random bytes.
///
/// Lengths below 8 are raised to 8. The single value whose magnitude does not
/// fit (`i64::MIN`) maps to 0.
pub fn random_i64(byte_length: usize) -> i64 {
    let bytes = random_bytes(byte_length.max(8));
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[..8]);
    i64::from_be_bytes(word).checked_abs().unwrap_or(0)
}

/// Non-negative random 32-bit number drawn from `byte_length` random bytes.
///
/// Lengths below 8 are raised to 8. `i32::MIN` maps to 0.
pub fn random_i32(byte_length: usize) -> i32 {
    let bytes = random_bytes(byte_length.max(8));
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[..4]);
    i32::from_be_bytes(word).checked_abs().unwrap_or(0)
}
