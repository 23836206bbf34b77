//! Configuration constants and types for saltcellar.

use crate::crypto::{Pepper, PasswordHasher, SecretMaterial};
use crate::error::{ensure_not_blank, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// PBKDF2-HMAC-SHA1 parameters for symmetric key derivation.
///
/// Changing any of these makes previously encrypted payloads undecryptable.
pub mod kdf_params {
    /// Iteration count.
    pub const ITERATIONS: u32 = 2048;

    /// AES block / CBC IV length in bytes.
    pub const IV_LENGTH: usize = 16;

    /// AES-256 key length in bytes.
    pub const KEY_LENGTH: usize = 32;

    /// Pepper appended to the second secret by the default derivation.
    ///
    /// Kept only so existing ciphertext stays readable. New deployments
    /// should inject their own pepper through `KeyDerivation::new`.
    pub const LEGACY_PEPPER: [u8; 8] = [1, 3, 253, 2, 8, 134, 65, 87];
}

/// PBKDF2-HMAC-SHA512 parameters for password hashing.
pub mod password_params {
    /// Current record format version.
    pub const VERSION: u8 = 1;

    /// Random salt length in bytes (128 bits).
    pub const SALT_LENGTH: usize = 16;

    /// Derived hash length in bytes (512 bits).
    pub const HASH_LENGTH: usize = 64;

    /// Iteration count.
    pub const ITERATIONS: u32 = 10_000;

    /// Total record length: version || salt || hash.
    pub const RECORD_LENGTH: usize = 1 + SALT_LENGTH + HASH_LENGTH;
}

/// Secret values an embedding application hands to this crate.
///
/// All fields are base64 strings. Loading them (from a vault, a config file,
/// the environment) is the application's job.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SecurityConfig {
    /// First encryption secret (base64).
    pub encryption_key_one: String,

    /// Second encryption secret (base64).
    pub encryption_key_two: String,

    /// Pepper for password hashing (base64).
    pub password_pepper: String,
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("encryption_key_one", &"<redacted>")
            .field("encryption_key_two", &"<redacted>")
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}

impl SecurityConfig {
    /// Create a new configuration from base64 strings.
    pub fn new(
        encryption_key_one: impl Into<String>,
        encryption_key_two: impl Into<String>,
        password_pepper: impl Into<String>,
    ) -> Self {
        Self {
            encryption_key_one: encryption_key_one.into(),
            encryption_key_two: encryption_key_two.into(),
            password_pepper: password_pepper.into(),
        }
    }

    /// Validate the configuration.
    ///
    /// Every field must be non-blank and decode to a non-empty byte sequence.
    pub fn validate(&self) -> Result<()> {
        ensure_not_blank(&self.password_pepper, "password_pepper")?;
        self.secret_material()?;
        self.pepper()?;
        Ok(())
    }

    /// Build a fresh single-use [`SecretMaterial`] from the encryption keys.
    pub fn secret_material(&self) -> Result<SecretMaterial> {
        SecretMaterial::from_base64(&self.encryption_key_one, &self.encryption_key_two)
    }

    /// Decode the password pepper.
    pub fn pepper(&self) -> Result<Pepper> {
        Pepper::from_base64(&self.password_pepper)
    }

    /// Build a [`PasswordHasher`] using the configured pepper.
    pub fn password_hasher(&self) -> Result<PasswordHasher> {
        Ok(PasswordHasher::new(self.pepper()?))
    }
}
