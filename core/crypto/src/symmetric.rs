//! Symmetric text encryption with AES in CBC mode.
//!
//! Cipher text is rendered as `IV_HEX + "_" + CIPHER_HEX` so it survives
//! URLs and plain-text storage. Two paddings are supported: PKCS#7 for
//! [`encrypt`]/[`decrypt`] and ISO 10126 for the legacy
//! [`custom_encrypt`]/[`custom_decrypt`] pair.

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::block_padding::{Iso10126, Pkcs7};
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::random::random_bytes;
use cryptkit_common::codec::{bytes_to_hex, bytes_to_utf8_string, hex_to_bytes};
use cryptkit_common::{Error, Outcome, Result, SensitiveBytes};

/// IV size in bytes (one AES block).
pub const IV_SIZE: usize = 16;

const SEPARATOR: char = '_';

/// AES key sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AesKeySize {
    Size128,
    Size192,
    Size256,
}

impl AesKeySize {
    pub const ALL: [AesKeySize; 3] = [
        AesKeySize::Size128,
        AesKeySize::Size192,
        AesKeySize::Size256,
    ];

    pub fn bits(self) -> usize {
        match self {
            AesKeySize::Size128 => 128,
            AesKeySize::Size192 => 192,
            AesKeySize::Size256 => 256,
        }
    }

    pub fn bytes(self) -> usize {
        self.bits() / 8
    }

    /// Key size matching a bit count.
    pub fn from_bits(bits: usize) -> Result<Self> {
        match bits {
            128 => Ok(AesKeySize::Size128),
            192 => Ok(AesKeySize::Size192),
            256 => Ok(AesKeySize::Size256),
            _ => Err(Error::InvalidInput(format!("Unsupported key size: {}", bits))),
        }
    }
}

/// Rijndael block sizes accepted by the legacy cipher.
///
/// Only `Size128` (the AES block) is implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockSize {
    Size128,
    Size192,
    Size256,
}

impl BlockSize {
    pub fn bits(self) -> usize {
        match self {
            BlockSize::Size128 => 128,
            BlockSize::Size192 => 192,
            BlockSize::Size256 => 256,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Padding {
    Pkcs7,
    Iso10126,
}

macro_rules! cbc_encrypt {
    ($cipher:ty, $padding:ty, $key:expr, $iv:expr, $data:expr) => {
        cbc::Encryptor::<$cipher>::new_from_slices($key, $iv)
            .map(|enc| enc.encrypt_padded_vec_mut::<$padding>($data))
            .map_err(|e| Error::Crypto(format!("Invalid key or IV length: {}", e)))
    };
}

macro_rules! cbc_decrypt {
    ($cipher:ty, $padding:ty, $key:expr, $iv:expr, $data:expr) => {
        cbc::Decryptor::<$cipher>::new_from_slices($key, $iv)
            .map_err(|e| Error::Crypto(format!("Invalid key or IV length: {}", e)))?
            .decrypt_padded_vec_mut::<$padding>($data)
            .map_err(|_| Error::Crypto("Decryption failed: invalid padding".to_string()))
    };
}

fn encrypt_block_mode(
    padding: Padding,
    key_size: AesKeySize,
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    match (padding, key_size) {
        (Padding::Pkcs7, AesKeySize::Size128) => cbc_encrypt!(Aes128, Pkcs7, key, iv, plaintext),
        (Padding::Pkcs7, AesKeySize::Size192) => cbc_encrypt!(Aes192, Pkcs7, key, iv, plaintext),
        (Padding::Pkcs7, AesKeySize::Size256) => cbc_encrypt!(Aes256, Pkcs7, key, iv, plaintext),
        (Padding::Iso10126, AesKeySize::Size128) => {
            cbc_encrypt!(Aes128, Iso10126, key, iv, plaintext)
        }
        (Padding::Iso10126, AesKeySize::Size192) => {
            cbc_encrypt!(Aes192, Iso10126, key, iv, plaintext)
        }
        (Padding::Iso10126, AesKeySize::Size256) => {
            cbc_encrypt!(Aes256, Iso10126, key, iv, plaintext)
        }
    }
}

fn decrypt_block_mode(
    padding: Padding,
    key_size: AesKeySize,
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    match (padding, key_size) {
        (Padding::Pkcs7, AesKeySize::Size128) => cbc_decrypt!(Aes128, Pkcs7, key, iv, ciphertext),
        (Padding::Pkcs7, AesKeySize::Size192) => cbc_decrypt!(Aes192, Pkcs7, key, iv, ciphertext),
        (Padding::Pkcs7, AesKeySize::Size256) => cbc_decrypt!(Aes256, Pkcs7, key, iv, ciphertext),
        (Padding::Iso10126, AesKeySize::Size128) => {
            cbc_decrypt!(Aes128, Iso10126, key, iv, ciphertext)
        }
        (Padding::Iso10126, AesKeySize::Size192) => {
            cbc_decrypt!(Aes192, Iso10126, key, iv, ciphertext)
        }
        (Padding::Iso10126, AesKeySize::Size256) => {
            cbc_decrypt!(Aes256, Iso10126, key, iv, ciphertext)
        }
    }
}

/// Decode a hex key and check it matches `key_size`.
fn parse_key(key: &str, key_size: AesKeySize) -> Result<SensitiveBytes> {
    let bytes = SensitiveBytes::from_hex(key.trim()).map_err(|_| {
        Error::Format("The key was malformed and could not be converted to bytes".to_string())
    })?;
    if bytes.len() != key_size.bytes() {
        return Err(Error::InvalidInput(format!(
            "The key did not match the specified key size of {} bits",
            key_size.bits()
        )));
    }
    Ok(bytes)
}

/// Split `IV_HEX_CIPHERHEX` into IV and cipher bytes.
fn parse_cipher_text(cipher_text: &str) -> Result<(Vec<u8>, Vec<u8>)> {
    let malformed =
        || Error::Format("The cipher text was not in the correct encrypted format".to_string());

    let mut parts = cipher_text.trim().split(SEPARATOR);
    let (iv_hex, data_hex) = match (parts.next(), parts.next(), parts.next()) {
        (Some(iv), Some(data), None) => (iv, data),
        _ => return Err(malformed()),
    };
    if iv_hex.len() % 2 != 0 || data_hex.len() % 2 != 0 || data_hex.is_empty() {
        return Err(malformed());
    }

    let iv = hex_to_bytes(iv_hex).map_err(|_| malformed())?;
    if iv.len() != IV_SIZE {
        return Err(malformed());
    }
    let data = hex_to_bytes(data_hex).map_err(|_| malformed())?;
    Ok((iv, data))
}

fn encrypt_text(padding: Padding, text: &str, key: &str, key_size: AesKeySize) -> Result<String> {
    if text.trim().is_empty() {
        return Err(Error::InvalidInput("There was nothing to encrypt".to_string()));
    }
    if key.trim().is_empty() {
        return Err(Error::InvalidInput(
            "The given encryption key was null or empty".to_string(),
        ));
    }

    let key_bytes = parse_key(key, key_size)?;
    let iv = random_bytes(IV_SIZE);
    let ciphertext = encrypt_block_mode(
        padding,
        key_size,
        key_bytes.as_bytes(),
        &iv,
        text.as_bytes(),
    )?;

    Ok(format!(
        "{}{}{}",
        bytes_to_hex(&iv),
        SEPARATOR,
        bytes_to_hex(&ciphertext)
    ))
}

fn decrypt_text(
    padding: Padding,
    cipher_text: &str,
    key: &str,
    key_size: AesKeySize,
) -> Result<String> {
    if cipher_text.trim().is_empty() {
        return Err(Error::InvalidInput(
            "There was no text given to decrypt".to_string(),
        ));
    }
    if key.trim().is_empty() {
        return Err(Error::InvalidInput(
            "Could not decrypt the text. The given key was null or empty".to_string(),
        ));
    }

    let key_bytes = parse_key(key, key_size)?;
    let (iv, data) = parse_cipher_text(cipher_text)?;
    let plaintext = decrypt_block_mode(padding, key_size, key_bytes.as_bytes(), &iv, &data)?;
    bytes_to_utf8_string(&plaintext)
}

fn check_block_size(block_size: BlockSize) -> Result<()> {
    if block_size != BlockSize::Size128 {
        return Err(Error::Crypto(format!(
            "Unsupported block size of {} bits; only 128-bit blocks are available",
            block_size.bits()
        )));
    }
    Ok(())
}

/// Encrypt UTF-8 text with AES-CBC and PKCS#7 padding.
///
/// # Preconditions
/// - `text` must not be blank
/// - `key` must be hex encoding exactly `key_size` bits
///
/// # Postconditions
/// - Returns `IV_HEX_CIPHERHEX` with a fresh random IV
///
/// # Errors
/// - `InvalidInput` for blank input or a key of the wrong size
/// - `Format` for a key that is not hex
pub fn encrypt(text: &str, key: &str, key_size: AesKeySize) -> Outcome<String> {
    encrypt_text(Padding::Pkcs7, text, key, key_size)
        .inspect_err(|e| debug!(error = %e, "AES encryption failed"))
        .into()
}

/// Decrypt text produced by [`encrypt`].
///
/// # Errors
/// - `InvalidInput` for blank input or a key of the wrong size
/// - `Format` for malformed cipher text or non-UTF-8 plaintext
/// - `Crypto` for a wrong key or tampered data (padding check)
pub fn decrypt(cipher_text: &str, key: &str, key_size: AesKeySize) -> Outcome<String> {
    decrypt_text(Padding::Pkcs7, cipher_text, key, key_size)
        .inspect_err(|e| debug!(error = %e, "AES decryption failed"))
        .into()
}

/// Encrypt with the legacy Rijndael-style cipher (CBC, ISO 10126 padding).
pub fn custom_encrypt(
    text: &str,
    key: &str,
    key_size: AesKeySize,
    block_size: BlockSize,
) -> Outcome<String> {
    check_block_size(block_size)
        .and_then(|_| encrypt_text(Padding::Iso10126, text, key, key_size))
        .inspect_err(|e| debug!(error = %e, "Legacy encryption failed"))
        .into()
}

/// Decrypt text produced by [`custom_encrypt`].
pub fn custom_decrypt(
    cipher_text: &str,
    key: &str,
    key_size: AesKeySize,
    block_size: BlockSize,
) -> Outcome<String> {
    check_block_size(block_size)
        .and_then(|_| decrypt_text(Padding::Iso10126, cipher_text, key, key_size))
        .inspect_err(|e| debug!(error = %e, "Legacy decryption failed"))
        .into()
}

/// Whether `text` decrypts under `key` with any supported key size or variant.
pub fn is_encrypted(text: &str, key: &str) -> bool {
    if text.trim().is_empty() || key.trim().is_empty() {
        return false;
    }

    AesKeySize::ALL.iter().any(|&size| {
        decrypt(text, key, size).is_ok()
            || custom_decrypt(text, key, size, BlockSize::Size128).is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{generate_128_bit_key, generate_192_bit_key, generate_256_bit_key};

    const PLAINTEXT: &str = "Encrypt me! Ünïcödé and symbols #*@ are fine.";

    fn keys() -> [(AesKeySize, String); 3] {
        [
            (AesKeySize::Size128, generate_128_bit_key()),
            (AesKeySize::Size192, generate_192_bit_key()),
            (AesKeySize::Size256, generate_256_bit_key()),
        ]
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip_all_key_sizes() {
        for (size, key) in keys() {
            let encrypted = encrypt(PLAINTEXT, &key, size).into_result().unwrap();
            let decrypted = decrypt(&encrypted, &key, size).into_result().unwrap();
            assert_eq!(decrypted, PLAINTEXT);
        }
    }

    #[test]
    fn test_custom_roundtrip_all_key_sizes() {
        for (size, key) in keys() {
            let encrypted = custom_encrypt(PLAINTEXT, &key, size, BlockSize::Size128)
                .into_result()
                .unwrap();
            let decrypted = custom_decrypt(&encrypted, &key, size, BlockSize::Size128)
                .into_result()
                .unwrap();
            assert_eq!(decrypted, PLAINTEXT);
        }
    }

    #[test]
    fn test_wire_format() {
        let key = generate_256_bit_key();
        let encrypted = encrypt("short", &key, AesKeySize::Size256)
            .into_result()
            .unwrap();

        let (iv, data) = encrypted.split_once('_').unwrap();
        assert_eq!(iv.len(), IV_SIZE * 2);
        // "short" pads to a single block.
        assert_eq!(data.len(), 32);
    }

    #[test]
    fn test_fresh_iv_each_time() {
        let key = generate_128_bit_key();
        let a = encrypt(PLAINTEXT, &key, AesKeySize::Size128).into_result().unwrap();
        let b = encrypt(PLAINTEXT, &key, AesKeySize::Size128).into_result().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_size_mismatch() {
        let key = generate_128_bit_key();
        let outcome = encrypt(PLAINTEXT, &key, AesKeySize::Size256);
        assert!(matches!(outcome.error(), Some(Error::InvalidInput(_))));
    }

    #[test]
    fn test_non_hex_key() {
        let outcome = encrypt(PLAINTEXT, "this is not hex at all!!", AesKeySize::Size128);
        assert!(matches!(outcome.error(), Some(Error::Format(_))));
    }

    #[test]
    fn test_blank_inputs() {
        let key = generate_128_bit_key();
        assert!(encrypt("  ", &key, AesKeySize::Size128).is_fail());
        assert!(encrypt(PLAINTEXT, "", AesKeySize::Size128).is_fail());
        assert!(decrypt("", &key, AesKeySize::Size128).is_fail());
    }

    #[test]
    fn test_malformed_cipher_text() {
        let key = generate_128_bit_key();
        for bad in ["nounderscore", "a_b_c", "ABC_DEF0", "00112233445566778899AABBCCDDEEFF_XYZ1"] {
            let outcome = decrypt(bad, &key, AesKeySize::Size128);
            assert!(matches!(outcome.error(), Some(Error::Format(_))), "{}", bad);
        }
    }

    #[test]
    fn test_wrong_key_fails() {
        let key1 = generate_256_bit_key();
        let key2 = generate_256_bit_key();
        let encrypted = encrypt(PLAINTEXT, &key1, AesKeySize::Size256)
            .into_result()
            .unwrap();
        assert!(decrypt(&encrypted, &key2, AesKeySize::Size256).is_fail());
    }

    #[test]
    fn test_unsupported_block_size() {
        let key = generate_128_bit_key();
        let outcome = custom_encrypt(PLAINTEXT, &key, AesKeySize::Size128, BlockSize::Size256);
        assert!(matches!(outcome.error(), Some(Error::Crypto(_))));
    }

    #[test]
    fn test_is_encrypted() {
        let key = generate_192_bit_key();
        let aes = encrypt(PLAINTEXT, &key, AesKeySize::Size192).into_result().unwrap();
        let legacy = custom_encrypt(PLAINTEXT, &key, AesKeySize::Size192, BlockSize::Size128)
            .into_result()
            .unwrap();

        assert!(is_encrypted(&aes, &key));
        assert!(is_encrypted(&legacy, &key));
        assert!(!is_encrypted(PLAINTEXT, &key));
        assert!(!is_encrypted("", &key));
    }

    #[test]
    fn test_key_size_from_bits() {
        assert_eq!(AesKeySize::from_bits(192).unwrap(), AesKeySize::Size192);
        assert!(AesKeySize::from_bits(512).is_err());
    }
}
