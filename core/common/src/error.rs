//! Common error types for CryptKit.

use thiserror::Error;

/// Top-level error type for CryptKit operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A derivation context was built with parameters below the RFC 2898 minimums.
    #[error("Construction error: {0}")]
    Construction(#[from] ConstructionError),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed hexadecimal, Base64 or UTF-8 data.
    #[error("Format error: {0}")]
    Format(String),

    /// Recomputing a derived key failed.
    #[error("Derivation error: {0}")]
    Derivation(String),

    /// A recomputed hash did not match the stored one.
    #[error("Mismatch: {0}")]
    Mismatch(String),

    /// Cipher operation failed.
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Configuration is inconsistent or out of range.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// RFC 2898 parameter violations detected when a derivation context is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// Iteration count below the recommended floor.
    #[error("iteration count {iterations} is less than the {minimum} recommended in RFC 2898")]
    IterationsTooLow { iterations: u32, minimum: u32 },

    /// Salt shorter than the recommended floor.
    #[error("salt of {length} bytes is less than the {minimum} byte size recommended in RFC 2898")]
    SaltTooShort { length: usize, minimum: usize },
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_error_message() {
        let err = Error::from(ConstructionError::IterationsTooLow {
            iterations: 999,
            minimum: 1000,
        });
        assert_eq!(
            err.to_string(),
            "Construction error: iteration count 999 is less than the 1000 recommended in RFC 2898"
        );
    }

    #[test]
    fn test_messages_never_empty() {
        let errors = [
            Error::InvalidInput(String::new()),
            Error::Format(String::new()),
            Error::Derivation(String::new()),
            Error::Mismatch(String::new()),
        ];
        for err in errors {
            assert!(!err.to_string().trim().is_empty());
        }
    }
}
