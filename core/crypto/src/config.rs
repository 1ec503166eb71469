//! Password hashing parameters.

use std::ops::Range;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::rfc2898::{HASH_LENGTH, MIN_ITERATIONS, MIN_SALT_LENGTH};
use cryptkit_common::{Error, Result, SensitiveBytes};

/// Parameters for the password hashing service.
///
/// Iteration count and salt size are drawn per password from half-open
/// ranges so stored records do not share a fixed cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PasswordHashingConfig {
    /// Lowest iteration count (inclusive).
    pub min_iterations: u32,
    /// Highest iteration count (exclusive).
    pub max_iterations: u32,
    /// Smallest salt size in bytes (inclusive).
    pub min_salt_size: usize,
    /// Largest salt size in bytes (exclusive for generation, inclusive for validation).
    pub max_salt_size: usize,
    /// Shortest accepted password in UTF-8 bytes.
    pub min_password_size: usize,
    /// Longest accepted password in UTF-8 bytes.
    pub max_password_size: usize,
    /// Iterations used when layering the global application salt.
    pub app_hash_iterations: u32,
    /// Derived key length in bytes.
    pub key_length: usize,
    /// Secret hex-encoded salt applied to every password before stretching.
    pub global_salt: Option<String>,
}

impl PasswordHashingConfig {
    /// Default parameters without a global application salt.
    pub fn new() -> Self {
        Self {
            min_iterations: 8000,
            max_iterations: 15000,
            min_salt_size: 64,
            max_salt_size: 96,
            min_password_size: 8,
            max_password_size: 1024,
            app_hash_iterations: 6000,
            key_length: HASH_LENGTH,
            global_salt: None,
        }
    }

    /// Set the global application salt (hex).
    pub fn with_global_salt(mut self, salt: impl Into<String>) -> Self {
        self.global_salt = Some(salt.into());
        self
    }

    /// Set the iteration range.
    pub fn with_iterations(mut self, range: Range<u32>) -> Self {
        self.min_iterations = range.start;
        self.max_iterations = range.end;
        self
    }

    /// Set the salt size range.
    pub fn with_salt_size(mut self, range: Range<usize>) -> Self {
        self.min_salt_size = range.start;
        self.max_salt_size = range.end;
        self
    }

    /// Set the iterations used for the application-level hash.
    pub fn with_app_hash_iterations(mut self, iterations: u32) -> Self {
        self.app_hash_iterations = iterations;
        self
    }

    pub fn iteration_range(&self) -> Range<u32> {
        self.min_iterations..self.max_iterations
    }

    pub fn salt_size_range(&self) -> Range<usize> {
        self.min_salt_size..self.max_salt_size
    }

    /// The configured global salt, ignoring blank values.
    pub fn global_salt(&self) -> Option<&str> {
        self.global_salt
            .as_deref()
            .filter(|salt| !salt.trim().is_empty())
    }

    /// Decode the global salt, checking it is usable as a PBKDF2 salt.
    ///
    /// # Errors
    /// - `Error::Format` if the salt is not hex
    /// - `Error::Config` if it decodes to fewer than `MIN_SALT_LENGTH` or more
    ///   than `max_salt_size` bytes
    pub fn decode_global_salt(&self) -> Result<Option<SensitiveBytes>> {
        let Some(salt) = self.global_salt() else {
            return Ok(None);
        };

        let bytes = SensitiveBytes::from_hex(salt.trim()).map_err(|_| {
            Error::Format("The global application salt is not valid hex".to_string())
        })?;
        if bytes.len() < MIN_SALT_LENGTH || bytes.len() > self.max_salt_size {
            return Err(Error::Config(format!(
                "The global application salt is {} bytes; it must be between {} and {}",
                bytes.len(),
                MIN_SALT_LENGTH,
                self.max_salt_size
            )));
        }
        Ok(Some(bytes))
    }

    /// Hex length of the application-level hash fed to per-record stretching.
    pub fn app_hash_length(&self) -> usize {
        if self.global_salt().is_some() {
            self.key_length.saturating_mul(2)
        } else {
            HASH_LENGTH * 2
        }
    }

    /// Check that generated parameters can never violate RFC 2898 minimums
    /// and that every well-formed password can be hashed.
    ///
    /// # Errors
    /// - `Error::Config` describing the first inconsistency found
    /// - `Error::Format` if the global salt is not hex
    pub fn validate(&self) -> Result<()> {
        if self.min_iterations < MIN_ITERATIONS {
            return Err(Error::Config(format!(
                "Minimum iterations {} is below the RFC 2898 floor of {}",
                self.min_iterations, MIN_ITERATIONS
            )));
        }
        if self.max_iterations <= self.min_iterations {
            return Err(Error::Config("Iteration range is empty".to_string()));
        }
        if self.min_salt_size < MIN_SALT_LENGTH {
            return Err(Error::Config(format!(
                "Minimum salt size {} is below the RFC 2898 floor of {}",
                self.min_salt_size, MIN_SALT_LENGTH
            )));
        }
        if self.max_salt_size <= self.min_salt_size {
            return Err(Error::Config("Salt size range is empty".to_string()));
        }
        if self.min_password_size == 0 || self.max_password_size < self.min_password_size {
            return Err(Error::Config("Password size bounds are invalid".to_string()));
        }
        if self.app_hash_iterations < MIN_ITERATIONS {
            return Err(Error::Config(format!(
                "Application hash iterations {} is below the RFC 2898 floor of {}",
                self.app_hash_iterations, MIN_ITERATIONS
            )));
        }
        if self.key_length == 0 {
            return Err(Error::Config("Key length must be positive".to_string()));
        }

        let app_hash_length = self.app_hash_length();
        if !(self.min_password_size..=self.max_password_size).contains(&app_hash_length) {
            return Err(Error::Config(format!(
                "Password size bounds {}..={} reject the {}-character application-level hash",
                self.min_password_size, self.max_password_size, app_hash_length
            )));
        }

        self.decode_global_salt()?;
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl Default for PasswordHashingConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PasswordHashingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.iteration_range(), 8000..15000);
        assert_eq!(config.salt_size_range(), 64..96);
        assert_eq!(config.key_length, 64);
        assert_eq!(config.app_hash_iterations, 6000);
        assert_eq!(config.min_password_size, 8);
        assert_eq!(config.max_password_size, 1024);
        assert_eq!(config.global_salt, None);
    }

    #[test]
    fn test_rejects_bounds_that_exclude_app_hash() {
        assert!(matches!(
            PasswordHashingConfig::from_json(r#"{"maxPasswordSize": 64}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            PasswordHashingConfig::from_json(r#"{"minPasswordSize": 200}"#),
            Err(Error::Config(_))
        ));
        assert!(PasswordHashingConfig::from_json(r#"{"maxPasswordSize": 128}"#).is_ok());
    }

    #[test]
    fn test_bounds_follow_key_length_with_global_salt() {
        let mut config = PasswordHashingConfig::new().with_global_salt("00".repeat(16));
        config.key_length = 32;
        config.max_password_size = 100;
        assert!(config.validate().is_ok());

        config.key_length = 64;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_unusable_global_salt() {
        let not_hex = PasswordHashingConfig::new().with_global_salt("zz-not-hex");
        assert!(matches!(not_hex.validate(), Err(Error::Format(_))));

        let too_short = PasswordHashingConfig::new().with_global_salt("00".repeat(4));
        assert!(matches!(too_short.validate(), Err(Error::Config(_))));

        let too_long = PasswordHashingConfig::new().with_global_salt("00".repeat(128));
        assert!(matches!(too_long.validate(), Err(Error::Config(_))));

        let usable = PasswordHashingConfig::new().with_global_salt("ab".repeat(32));
        assert_eq!(usable.decode_global_salt().unwrap().unwrap().len(), 32);
    }

    #[test]
    fn test_rejects_low_iterations() {
        let config = PasswordHashingConfig::new().with_iterations(999..2000);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_short_salt_and_empty_ranges() {
        assert!(PasswordHashingConfig::new()
            .with_salt_size(7..16)
            .validate()
            .is_err());
        assert!(PasswordHashingConfig::new()
            .with_salt_size(16..16)
            .validate()
            .is_err());
        assert!(PasswordHashingConfig::new()
            .with_iterations(5000..5000)
            .validate()
            .is_err());
    }

    #[test]
    fn test_blank_global_salt_is_ignored() {
        let config = PasswordHashingConfig::new().with_global_salt("   ");
        assert_eq!(config.global_salt(), None);
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            PasswordHashingConfig::from_json(r#"{"minIterations": 2000, "maxIterations": 3000}"#)
                .unwrap();
        assert_eq!(config.iteration_range(), 2000..3000);
        assert_eq!(config.salt_size_range(), 64..96);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            PasswordHashingConfig::from_json(r#"{"minIterations": 10}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            PasswordHashingConfig::from_json("not json"),
            Err(Error::Serialization(_))
        ));
    }
}
