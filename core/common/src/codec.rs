//! Conversions between bytes and hex, UTF-8 and Base64 text.
//!
//! Hex output is upper-case; hex input is accepted in either case.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{Error, Result};

/// Encode bytes as upper-case hexadecimal.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Decode a hexadecimal string.
///
/// # Errors
/// - `Error::Format` if the string has odd length or contains non-hex characters
pub fn hex_to_bytes(hex_str: &str) -> Result<Vec<u8>> {
    if hex_str.len() % 2 != 0 {
        return Err(Error::Format(format!(
            "Hex string has odd length {}",
            hex_str.len()
        )));
    }
    hex::decode(hex_str).map_err(|e| Error::Format(format!("Invalid hex string: {}", e)))
}

/// UTF-8 bytes of a string.
pub fn str_to_utf8_bytes(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// Interpret bytes as UTF-8.
///
/// # Errors
/// - `Error::Format` if the bytes are not valid UTF-8
pub fn bytes_to_utf8_string(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| Error::Format(format!("Invalid UTF-8 data: {}", e)))
}

/// Encode bytes as standard padded Base64.
pub fn bytes_to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard padded Base64.
pub fn base64_to_bytes(encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .map_err(|e| Error::Format(format!("Invalid Base64 string: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hex_is_upper_case() {
        assert_eq!(bytes_to_hex(&[0x00, 0xab, 0xff, 0x10]), "00ABFF10");
    }

    #[test]
    fn test_hex_decode_accepts_both_cases() {
        assert_eq!(hex_to_bytes("00abFF10").unwrap(), vec![0x00, 0xab, 0xff, 0x10]);
        assert!(hex_to_bytes("").unwrap().is_empty());
    }

    #[test]
    fn test_hex_decode_rejects_odd_length() {
        assert!(matches!(hex_to_bytes("abc"), Err(Error::Format(_))));
    }

    #[test]
    fn test_hex_decode_rejects_non_hex() {
        assert!(matches!(hex_to_bytes("zz"), Err(Error::Format(_))));
    }

    #[test]
    fn test_utf8_invalid_bytes() {
        assert!(matches!(
            bytes_to_utf8_string(&[0xff, 0xfe]),
            Err(Error::Format(_))
        ));
        assert_eq!(bytes_to_utf8_string(b"caf\xc3\xa9").unwrap(), "café");
    }

    #[test]
    fn test_base64_known_value() {
        assert_eq!(bytes_to_base64(b"hello"), "aGVsbG8=");
        assert!(base64_to_bytes("not base64!").is_err());
    }

    proptest! {
        #[test]
        fn prop_hex_length_doubles(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
            let encoded = bytes_to_hex(&bytes);
            prop_assert_eq!(encoded.len(), bytes.len() * 2);
            prop_assert_eq!(hex_to_bytes(&encoded.to_lowercase()).unwrap(), bytes);
        }
    }
}
