//! Digest and HMAC helpers returning encoded strings.
//!
//! These are general-purpose helpers. MD5 and SHA-1 are provided for
//! interoperability only; none of these are suitable for storing passwords,
//! use [`crate::password::PasswordHasher`] for that.

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

use cryptkit_common::codec::{bytes_to_base64, bytes_to_hex};
use cryptkit_common::{Error, Result};

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Digest size in bytes.
    pub fn output_size(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Raw digest of `data`.
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Md5 => Md5::digest(data).to_vec(),
            HashAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
            HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    /// Raw HMAC of `data` keyed with `key`.
    ///
    /// # Errors
    /// - `Error::Crypto` if the MAC rejects the key
    pub fn hmac(self, key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        match self {
            HashAlgorithm::Md5 => mac::<Hmac<Md5>>(key, data),
            HashAlgorithm::Sha1 => mac::<Hmac<Sha1>>(key, data),
            HashAlgorithm::Sha256 => mac::<Hmac<Sha256>>(key, data),
            HashAlgorithm::Sha384 => mac::<Hmac<Sha384>>(key, data),
            HashAlgorithm::Sha512 => mac::<Hmac<Sha512>>(key, data),
        }
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(Error::InvalidInput(format!(
                "Unknown hash algorithm: {}",
                s
            ))),
        }
    }
}

/// Text encoding for HMAC output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestEncoding {
    #[default]
    Hex,
    Base64,
}

fn mac<M: Mac + KeyInit>(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <M as KeyInit>::new_from_slice(key)
        .map_err(|e| Error::Crypto(format!("Invalid MAC key: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Hex digest of `text` followed by `salt`.
///
/// Returns `None` when `text` is empty.
pub fn compute_hash(algorithm: HashAlgorithm, text: &str, salt: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let salted = format!("{}{}", text, salt);
    Some(bytes_to_hex(&algorithm.digest(salted.as_bytes())))
}

pub fn compute_md5_hash(text: &str, salt: &str) -> Option<String> {
    compute_hash(HashAlgorithm::Md5, text, salt)
}

pub fn compute_sha1_hash(text: &str, salt: &str) -> Option<String> {
    compute_hash(HashAlgorithm::Sha1, text, salt)
}

pub fn compute_sha256_hash(text: &str, salt: &str) -> Option<String> {
    compute_hash(HashAlgorithm::Sha256, text, salt)
}

pub fn compute_sha384_hash(text: &str, salt: &str) -> Option<String> {
    compute_hash(HashAlgorithm::Sha384, text, salt)
}

pub fn compute_sha512_hash(text: &str, salt: &str) -> Option<String> {
    compute_hash(HashAlgorithm::Sha512, text, salt)
}

/// Encoded HMAC of `text` keyed with the UTF-8 bytes of `key`.
///
/// Returns `Ok(None)` when either input is blank.
///
/// # Errors
/// - `Error::Crypto` if the MAC rejects the key
pub fn compute_hmac(
    algorithm: HashAlgorithm,
    text: &str,
    key: &str,
    encoding: DigestEncoding,
) -> Result<Option<String>> {
    if text.trim().is_empty() || key.trim().is_empty() {
        return Ok(None);
    }
    let tag = algorithm.hmac(key.as_bytes(), text.as_bytes())?;
    Ok(Some(match encoding {
        DigestEncoding::Hex => bytes_to_hex(&tag),
        DigestEncoding::Base64 => bytes_to_base64(&tag),
    }))
}
