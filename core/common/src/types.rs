//! Common types used throughout CryptKit.

use std::fmt;
use zeroize::Zeroize;

/// Sensitive data wrapper that zeroizes on drop.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SensitiveBytes(Vec<u8>);

impl SensitiveBytes {
    /// Create new sensitive bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self(data)
    }

    /// Decode sensitive bytes from hex.
    pub fn from_hex(hex_str: &str) -> crate::Result<Self> {
        crate::codec::hex_to_bytes(hex_str).map(Self)
    }

    /// Get a reference to the inner bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get the length.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for SensitiveBytes {
    fn from(data: Vec<u8>) -> Self {
        Self(data)
    }
}

impl fmt::Debug for SensitiveBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SensitiveBytes([REDACTED; {} bytes])", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SensitiveBytes::new(vec![1, 2, 3]);
        assert_eq!(format!("{:?}", secret), "SensitiveBytes([REDACTED; 3 bytes])");
    }

    #[test]
    fn test_from_hex() {
        let secret = SensitiveBytes::from_hex("0A0b").unwrap();
        assert_eq!(secret.as_bytes(), &[0x0a, 0x0b]);
        assert!(SensitiveBytes::from_hex("0").is_err());
    }
}
