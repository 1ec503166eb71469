//! PBKDF2 key derivation (RFC 2898 §5.2) with HMAC-SHA512 as the PRF.
//!
//! The password keys the HMAC; each derived block `T_i` is the XOR of
//! `iterations` chained PRF outputs seeded with `salt || INT(i)`.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::Zeroize;

use cryptkit_common::{ConstructionError, Error, Result};

type HmacSha512 = Hmac<Sha512>;

/// Minimum iteration count recommended by RFC 2898.
pub const MIN_ITERATIONS: u32 = 1000;

/// Minimum salt length in bytes recommended by RFC 2898.
pub const MIN_SALT_LENGTH: usize = 8;

/// Output size of the HMAC-SHA512 PRF in bytes.
pub const HASH_LENGTH: usize = 64;

/// A validated PBKDF2-HMAC-SHA512 derivation context.
///
/// The HMAC key schedule for the password is computed once here and cloned
/// for every PRF call.
#[derive(Clone)]
pub struct Rfc2898<'a> {
    mac: HmacSha512,
    salt: &'a [u8],
    iterations: u32,
}

impl<'a> Rfc2898<'a> {
    /// Build a derivation context.
    ///
    /// # Errors
    /// - `ConstructionError::IterationsTooLow` if `iterations < MIN_ITERATIONS`
    /// - `ConstructionError::SaltTooShort` if `salt.len() < MIN_SALT_LENGTH`
    pub fn new(password: &[u8], salt: &'a [u8], iterations: u32) -> Result<Self> {
        if iterations < MIN_ITERATIONS {
            return Err(ConstructionError::IterationsTooLow {
                iterations,
                minimum: MIN_ITERATIONS,
            }
            .into());
        }

        if salt.len() < MIN_SALT_LENGTH {
            return Err(ConstructionError::SaltTooShort {
                length: salt.len(),
                minimum: MIN_SALT_LENGTH,
            }
            .into());
        }

        Self::keyed(password, salt, iterations)
    }

    /// Build a context without the RFC minimum checks.
    fn keyed(password: &[u8], salt: &'a [u8], iterations: u32) -> Result<Self> {
        let mac = HmacSha512::new_from_slice(password)
            .map_err(|e| Error::Derivation(format!("Invalid PRF key: {}", e)))?;

        Ok(Self {
            mac,
            salt,
            iterations,
        })
    }

    /// Iteration count of this context.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Derive `length` bytes of key material.
    ///
    /// Blocks are generated in order and the concatenation is truncated,
    /// never padded, to exactly `length` bytes.
    ///
    /// # Errors
    /// - `Error::Derivation` if `length` needs more than `u32::MAX` blocks
    pub fn derive_key(&self, length: usize) -> Result<Vec<u8>> {
        let block_count = u32::try_from(length.div_ceil(HASH_LENGTH)).map_err(|_| {
            Error::Derivation(format!("Derived key length {} is too long", length))
        })?;

        let mut derived = Vec::with_capacity(block_count as usize * HASH_LENGTH);
        for index in 1..=block_count {
            let mut block = self.block(index);
            derived.extend_from_slice(&block);
            block.zeroize();
        }

        derived.truncate(length);
        Ok(derived)
    }

    /// The function `F(P, S, c, i)` from RFC 2898.
    fn block(&self, index: u32) -> [u8; HASH_LENGTH] {
        let mut u = self.prf(&[self.salt, &index.to_be_bytes()]);
        let mut t = u;

        for _ in 1..self.iterations {
            u = self.prf(&[&u]);
            for (acc, byte) in t.iter_mut().zip(u.iter()) {
                *acc ^= byte;
            }
        }

        u.zeroize();
        t
    }

    fn prf(&self, message: &[&[u8]]) -> [u8; HASH_LENGTH] {
        let mut mac = self.mac.clone();
        for part in message {
            mac.update(part);
        }

        let mut out = [0u8; HASH_LENGTH];
        out.copy_from_slice(&mac.finalize().into_bytes());
        out
    }
}

/// Derive a key with PBKDF2-HMAC-SHA512.
///
/// # Preconditions
/// - `iterations >= MIN_ITERATIONS`
/// - `salt.len() >= MIN_SALT_LENGTH`
///
/// # Postconditions
/// - Returns exactly `length` bytes
/// - Output is deterministic for identical inputs
///
/// # Errors
/// - `Error::Construction` if a precondition is violated
pub fn derive_key(password: &[u8], salt: &[u8], iterations: u32, length: usize) -> Result<Vec<u8>> {
    Rfc2898::new(password, salt, iterations)?.derive_key(length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptkit_common::codec::hex_to_bytes;
    use proptest::prelude::*;

    const VECTOR_C1: &str = "867f70cf1ade02cff3752599a3a53dc4af34c7a669815ae5d513554e1c8cf252\
                             c02d470a285a0501bad999bfe943c08f050235d7d68b1da55e63f73b60a57fce";
    const VECTOR_C4096: &str = "d197b1b33db0143e018b12f3d1d1479e6cdebdcc97c5c0f87f6902e072f457b5\
                                143f30602641b3d55cd335988cb36b84376060ecd532e039b742a239434af2d5";

    fn unchecked(password: &[u8], salt: &[u8], iterations: u32, length: usize) -> Vec<u8> {
        Rfc2898::keyed(password, salt, iterations)
            .unwrap()
            .derive_key(length)
            .unwrap()
    }

    fn oracle(password: &[u8], salt: &[u8], iterations: u32, length: usize) -> Vec<u8> {
        let mut out = vec![0u8; length];
        pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, iterations, &mut out);
        out
    }

    #[test]
    fn test_known_vector_single_iteration() {
        let derived = unchecked(b"password", b"salt", 1, 64);
        assert_eq!(derived, hex_to_bytes(VECTOR_C1).unwrap());
    }

    #[test]
    fn test_known_vector_4096_iterations() {
        let derived = derive_key(b"password", b"saltsalt", 4096, 64).unwrap();
        assert_eq!(derived, oracle(b"password", b"saltsalt", 4096, 64));

        let derived = unchecked(b"password", b"salt", 4096, 64);
        assert_eq!(derived, hex_to_bytes(VECTOR_C4096).unwrap());
    }

    #[test]
    fn test_derive_key_deterministic() {
        let salt = [7u8; 16];
        let key1 = derive_key(b"test-password-123", &salt, 1000, 64).unwrap();
        let key2 = derive_key(b"test-password-123", &salt, 1000, 64).unwrap();
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_derive_key_sensitive_to_each_input() {
        let salt = [7u8; 16];
        let mut other_salt = salt;
        other_salt[15] ^= 0x01;

        let base = derive_key(b"password1", &salt, 1000, 64).unwrap();
        let by_password = derive_key(b"password0", &salt, 1000, 64).unwrap();
        let by_salt = derive_key(b"password1", &other_salt, 1000, 64).unwrap();
        let by_iterations = derive_key(b"password1", &salt, 1001, 64).unwrap();

        for other in [&by_password, &by_salt, &by_iterations] {
            let equal_bytes = base.iter().zip(other.iter()).filter(|(a, b)| a == b).count();
            assert!(equal_bytes < 8, "outputs are suspiciously similar");
        }
    }

    #[test]
    fn test_iteration_minimum() {
        let salt = [1u8; 8];
        let err = Rfc2898::new(b"password", &salt, 999).err().unwrap();
        assert!(matches!(
            err,
            Error::Construction(ConstructionError::IterationsTooLow {
                iterations: 999,
                minimum: 1000
            })
        ));
        assert!(Rfc2898::new(b"password", &salt, 1000).is_ok());
    }

    #[test]
    fn test_salt_minimum() {
        let err = Rfc2898::new(b"password", &[1u8; 7], 1000).err().unwrap();
        assert!(matches!(
            err,
            Error::Construction(ConstructionError::SaltTooShort {
                length: 7,
                minimum: 8
            })
        ));
        assert!(Rfc2898::new(b"password", &[1u8; 8], 1000).is_ok());
    }

    #[test]
    fn test_output_is_truncated_not_padded() {
        let long = unchecked(b"pw", b"salt", 3, 130);
        let short = unchecked(b"pw", b"salt", 3, 65);

        assert_eq!(long.len(), 130);
        assert_eq!(short.len(), 65);
        assert_eq!(&long[..65], &short[..]);
        assert!(unchecked(b"pw", b"salt", 3, 0).is_empty());
    }

    #[test]
    fn test_blocks_are_indexed_from_one() {
        // Second block must differ from the first; identical blocks would
        // mean the index is not mixed into the salt.
        let derived = unchecked(b"pw", b"salt", 2, 128);
        assert_ne!(&derived[..64], &derived[64..]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_matches_reference(
            password in proptest::collection::vec(any::<u8>(), 0..80),
            salt in proptest::collection::vec(any::<u8>(), 0..40),
            iterations in 1u32..6,
            length in 1usize..200,
        ) {
            prop_assert_eq!(
                unchecked(&password, &salt, iterations, length),
                oracle(&password, &salt, iterations, length)
            );
        }
    }
}
