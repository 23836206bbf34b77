//! Salted, peppered PBKDF2-HMAC-SHA512 password hashing.
//!
//! Stored records are base64 of `version (1) || salt (16) || hash (64)`.

use crate::config::password_params;
use crate::crypto::secret::Pepper;
use crate::error::{ensure_not_blank, Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha512;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// A parsed hashed-password record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedPasswordRecord {
    version: u8,
    salt: [u8; password_params::SALT_LENGTH],
    hash: [u8; password_params::HASH_LENGTH],
}

impl HashedPasswordRecord {
    /// Decode a stored record.
    ///
    /// The version byte is kept but not interpreted; every version is
    /// verified with the current algorithm.
    pub fn parse(encoded: &str) -> Result<Self> {
        let bytes = STANDARD.decode(encoded.trim())?;
        Self::from_bytes(&bytes)
    }

    /// Build a record from its raw 81-byte layout.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != password_params::RECORD_LENGTH {
            return Err(Error::Format(format!(
                "hashed password record must be {} bytes, got {}",
                password_params::RECORD_LENGTH,
                bytes.len()
            )));
        }

        let mut salt = [0u8; password_params::SALT_LENGTH];
        let mut hash = [0u8; password_params::HASH_LENGTH];
        salt.copy_from_slice(&bytes[1..1 + password_params::SALT_LENGTH]);
        hash.copy_from_slice(&bytes[1 + password_params::SALT_LENGTH..]);

        Ok(Self {
            version: bytes[0],
            salt,
            hash,
        })
    }

    /// Format version byte.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Per-record random salt (without pepper).
    pub fn salt(&self) -> &[u8; password_params::SALT_LENGTH] {
        &self.salt
    }

    /// Derived hash.
    pub fn hash(&self) -> &[u8; password_params::HASH_LENGTH] {
        &self.hash
    }

    /// Raw 81-byte layout.
    pub fn to_bytes(&self) -> [u8; password_params::RECORD_LENGTH] {
        let mut out = [0u8; password_params::RECORD_LENGTH];
        out[0] = self.version;
        out[1..1 + password_params::SALT_LENGTH].copy_from_slice(&self.salt);
        out[1 + password_params::SALT_LENGTH..].copy_from_slice(&self.hash);
        out
    }

    /// Base64 encoding for storage.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }
}

/// Hashes and verifies passwords. Holds only the pepper.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    pepper: Pepper,
}

impl PasswordHasher {
    /// Create a hasher using `pepper`.
    pub fn new(pepper: Pepper) -> Self {
        tracing::debug!(
            iterations = password_params::ITERATIONS,
            "password hasher initialized"
        );
        Self { pepper }
    }

    fn derive(
        &self,
        password: &str,
        salt: &[u8; password_params::SALT_LENGTH],
    ) -> Zeroizing<[u8; password_params::HASH_LENGTH]> {
        let seasoned = self.pepper.season(salt);
        let mut hash = Zeroizing::new([0u8; password_params::HASH_LENGTH]);
        pbkdf2_hmac::<Sha512>(
            password.as_bytes(),
            &seasoned,
            password_params::ITERATIONS,
            hash.as_mut_slice(),
        );
        hash
    }

    /// Hash a password with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        Ok(self.hash_password_record(password)?.to_base64())
    }

    /// Hash a password and return the parsed record.
    pub fn hash_password_record(&self, password: &str) -> Result<HashedPasswordRecord> {
        ensure_not_blank(password, "password")?;

        let mut salt = [0u8; password_params::SALT_LENGTH];
        rand::thread_rng().fill_bytes(&mut salt);

        let hash = self.derive(password, &salt);
        tracing::debug!(version = password_params::VERSION, "hashed password");

        Ok(HashedPasswordRecord {
            version: password_params::VERSION,
            salt,
            hash: *hash,
        })
    }

    /// Check `provided_password` against a stored base64 record.
    ///
    /// A mismatch returns `Ok(false)`; only blank arguments or a malformed
    /// record produce an error. The hash comparison runs in constant time.
    pub fn verify_hashed_password(&self, stored: &str, provided_password: &str) -> Result<bool> {
        ensure_not_blank(stored, "stored")?;
        ensure_not_blank(provided_password, "provided_password")?;

        let record = HashedPasswordRecord::parse(stored)?;
        Ok(self.verify_record(&record, provided_password))
    }

    /// Check `provided_password` against a parsed record.
    pub fn verify_record(&self, record: &HashedPasswordRecord, provided_password: &str) -> bool {
        let derived = self.derive(provided_password, &record.salt);
        let matches: bool = derived.as_slice().ct_eq(record.hash.as_slice()).into();

        tracing::debug!(version = record.version, matches, "verified password");
        matches
    }
}
