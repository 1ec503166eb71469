//! Cryptographic primitives for CryptKit.
//!
//! This module provides:
//! - PBKDF2 key derivation (RFC 2898) with HMAC-SHA512
//! - Salted, per-record randomized password hashing with an optional pepper
//! - Digest and HMAC helpers
//! - AES-CBC text encryption
//! - Secure random keys and numbers
//!
//! # Security Guarantees
//! - Intermediate key material is zeroized after use
//! - No plaintext, key or salt is ever logged
//! - Password hashes are compared in constant time

pub mod config;
pub mod hashing;
pub mod password;
pub mod random;
pub mod rfc2898;
pub mod symmetric;

pub use config::PasswordHashingConfig;
pub use hashing::{compute_hash, compute_hmac, DigestEncoding, HashAlgorithm};
pub use password::{PasswordHasher, PasswordHashingData};
pub use rfc2898::{derive_key, Rfc2898};
pub use symmetric::{decrypt, encrypt, AesKeySize, BlockSize};
