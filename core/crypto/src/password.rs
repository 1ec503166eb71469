//! Password hashing and verification.
//!
//! Every password gets its own random salt and iteration count. Both are
//! stored in the returned [`PasswordHashingData`] next to the hash, so a
//! record is all that is needed to verify a candidate later. An optional
//! global application salt (pepper) is folded in first and is never stored.

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::config::PasswordHashingConfig;
use crate::hashing::HashAlgorithm;
use crate::random::{random_bytes, random_in_range};
use crate::rfc2898::Rfc2898;
use cryptkit_common::codec::{bytes_to_hex, hex_to_bytes};
use cryptkit_common::{Error, Outcome, Result, SensitiveBytes};

/// A stored password hash together with the parameters that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordHashingData {
    /// PBKDF2 iteration count.
    #[serde(rename = "numberOfIterations")]
    pub iterations: u32,
    /// Salt size in bytes.
    pub salt_size: usize,
    /// Salt as upper-case hex.
    pub salt: String,
    /// Derived key as upper-case hex.
    pub hashed_password: String,
}

impl PasswordHashingData {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Hashes passwords and verifies candidates against stored records.
///
/// Immutable after construction and safe to share across threads.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    config: PasswordHashingConfig,
    pepper: Option<SensitiveBytes>,
}

impl PasswordHasher {
    /// Create a hasher from validated parameters.
    ///
    /// # Errors
    /// - `Error::Config` if the parameters are inconsistent or the global salt
    ///   decodes to an unusable length
    /// - `Error::Format` if the global salt is not hex
    pub fn new(config: PasswordHashingConfig) -> Result<Self> {
        config.validate()?;
        let pepper = config.decode_global_salt()?;
        Ok(Self { config, pepper })
    }

    /// Hasher with default parameters and no global salt.
    pub fn without_pepper() -> Self {
        Self {
            config: PasswordHashingConfig::default(),
            pepper: None,
        }
    }

    pub fn config(&self) -> &PasswordHashingConfig {
        &self.config
    }

    /// Whether a global application salt is configured.
    pub fn has_pepper(&self) -> bool {
        self.pepper.is_some()
    }

    /// Hash a plaintext password into a storable record.
    ///
    /// # Preconditions
    /// - `plaintext` must not be blank
    ///
    /// # Postconditions
    /// - `salt` holds `2 * salt_size` hex characters
    /// - `hashed_password` holds `2 * key_length` hex characters
    ///
    /// # Errors
    /// - `InvalidInput` for a blank password or one outside the size bounds;
    ///   the partially filled record is returned alongside the error
    pub fn hash_password(&self, plaintext: &str) -> Outcome<PasswordHashingData> {
        if plaintext.trim().is_empty() {
            return Outcome::fail(Error::InvalidInput(
                "There was no password given to hash".to_string(),
            ));
        }

        let iterations = random_in_range(self.config.iteration_range());
        let salt_size = random_in_range(self.config.salt_size_range());
        let salt = random_bytes(salt_size);

        let mut record = PasswordHashingData {
            iterations,
            salt_size,
            salt: bytes_to_hex(&salt),
            hashed_password: String::new(),
        };

        let mut app_hashed = self.app_level_hash(plaintext);
        let derived = self.compute_password_and_salt_bytes(&salt, &app_hashed, iterations);
        app_hashed.zeroize();

        match derived.into_result() {
            Ok(mut key) => {
                record.hashed_password = bytes_to_hex(&key);
                key.zeroize();
                debug!(iterations, salt_size, "Password hashed");
                Outcome::ok(record)
            }
            Err(e) => {
                debug!(error = %e, "Password hashing failed");
                Outcome::fail_with_value(e, record)
            }
        }
    }

    /// Derive `key_length` bytes from a password and raw salt.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank password, an empty or oversized salt, or
    ///   a password whose UTF-8 length is outside the configured bounds
    /// - `Construction` when `iterations` or the salt length are below the
    ///   RFC 2898 minimums
    pub fn compute_password_and_salt_bytes(
        &self,
        salt: &[u8],
        password: &str,
        iterations: u32,
    ) -> Outcome<Vec<u8>> {
        self.check_derivation_input(salt, password)
            .and_then(|_| Rfc2898::new(password.as_bytes(), salt, iterations))
            .and_then(|kdf| kdf.derive_key(self.config.key_length))
            .into()
    }

    fn check_derivation_input(&self, salt: &[u8], password: &str) -> Result<()> {
        if password.trim().is_empty() {
            return Err(Error::InvalidInput(
                "The password to derive from was empty".to_string(),
            ));
        }
        if salt.is_empty() {
            return Err(Error::InvalidInput("The salt was empty".to_string()));
        }
        if salt.len() > self.config.max_salt_size {
            return Err(Error::InvalidInput(format!(
                "The salt is longer than the maximum of {} bytes",
                self.config.max_salt_size
            )));
        }

        let length = password.len();
        if length < self.config.min_password_size || length > self.config.max_password_size {
            return Err(Error::InvalidInput(format!(
                "The password must be between {} and {} bytes long",
                self.config.min_password_size, self.config.max_password_size
            )));
        }
        Ok(())
    }

    /// Normalize a plaintext before per-record stretching.
    ///
    /// Without a global salt this is the SHA-512 hex digest. With one, the
    /// plaintext is stretched against the global salt instead. A password
    /// the derivation rejects (e.g. too short) is returned unchanged.
    pub fn app_level_hash(&self, plaintext: &str) -> String {
        if plaintext.trim().is_empty() {
            return plaintext.to_string();
        }

        let Some(pepper) = self.pepper.as_ref() else {
            let mut digest = HashAlgorithm::Sha512.digest(plaintext.as_bytes());
            let hex = bytes_to_hex(&digest);
            digest.zeroize();
            return hex;
        };

        match self
            .compute_password_and_salt_bytes(
                pepper.as_bytes(),
                plaintext,
                self.config.app_hash_iterations,
            )
            .into_result()
        {
            Ok(mut key) => {
                let hex = bytes_to_hex(&key);
                key.zeroize();
                hex
            }
            Err(e) => {
                warn!(error = %e, "Application-level hash failed; using the plain password");
                plaintext.to_string()
            }
        }
    }

    /// Verify `plaintext` against a stored record.
    ///
    /// The recomputed hash is compared in constant time.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank password, salt or hash
    /// - `Format` if the stored salt is not hex
    /// - `Derivation` if the hash cannot be recomputed
    /// - `Mismatch` if the password is wrong
    pub fn compare_passwords(&self, plaintext: &str, record: &PasswordHashingData) -> Outcome<()> {
        self.verify(plaintext, record)
            .inspect_err(|e| debug!(error = %e, "Password comparison failed"))
            .into()
    }

    fn verify(&self, plaintext: &str, record: &PasswordHashingData) -> Result<()> {
        if plaintext.trim().is_empty() {
            return Err(Error::InvalidInput(
                "There was no password given to compare".to_string(),
            ));
        }
        if record.salt.trim().is_empty() || record.hashed_password.trim().is_empty() {
            return Err(Error::InvalidInput(
                "The stored password record is incomplete".to_string(),
            ));
        }

        let salt = hex_to_bytes(record.salt.trim())
            .map_err(|_| Error::Format("The stored salt is not valid hex".to_string()))?;

        let mut app_hashed = self.app_level_hash(plaintext);
        let derived = self
            .compute_password_and_salt_bytes(&salt, &app_hashed, record.iterations)
            .into_result();
        app_hashed.zeroize();

        let mut key = derived.map_err(|e| Error::Derivation(e.to_string()))?;
        let computed = bytes_to_hex(&key);
        key.zeroize();

        let stored = record.hashed_password.trim().to_ascii_uppercase();
        if bool::from(computed.as_bytes().ct_eq(stored.as_bytes())) {
            Ok(())
        } else {
            Err(Error::Mismatch("The passwords do not match".to_string()))
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::without_pepper()
    }
}
