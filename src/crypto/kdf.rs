//! PBKDF2 key derivation for the symmetric cipher.

use crate::config::kdf_params;
use crate::crypto::secret::Pepper;
use crate::error::{ensure_not_empty, Result};
use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// IV and key for a single cipher operation. Wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKeyMaterial {
    iv: [u8; kdf_params::IV_LENGTH],
    key: [u8; kdf_params::KEY_LENGTH],
}

impl DerivedKeyMaterial {
    /// The CBC initialization vector.
    pub fn iv(&self) -> &[u8; kdf_params::IV_LENGTH] {
        &self.iv
    }

    /// The AES-256 key.
    pub fn key(&self) -> &[u8; kdf_params::KEY_LENGTH] {
        &self.key
    }
}

impl fmt::Debug for DerivedKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKeyMaterial(..)")
    }
}

/// Derives cipher IV and key from two secrets using PBKDF2-HMAC-SHA1.
#[derive(Debug, Clone)]
pub struct KeyDerivation {
    pepper: Pepper,
}

impl KeyDerivation {
    /// Create a derivation that appends `pepper` to the second secret.
    pub fn new(pepper: Pepper) -> Self {
        Self { pepper }
    }

    /// The pepper in use.
    pub fn pepper(&self) -> &Pepper {
        &self.pepper
    }

    /// Derive IV and key from the two secrets.
    ///
    /// `secret_one` is the PBKDF2 password, `secret_two || pepper` the salt.
    /// The IV is the first 16 bytes of the output stream and the key the
    /// following 32 bytes of the same stream, so one 48-byte derivation
    /// yields both. Existing ciphertext depends on this exact layout.
    pub fn derive(&self, secret_one: &[u8], secret_two: &[u8]) -> Result<DerivedKeyMaterial> {
        ensure_not_empty(secret_one, "secret_one")?;
        ensure_not_empty(secret_two, "secret_two")?;

        let salt = self.pepper.season(secret_two);
        tracing::debug!(iterations = kdf_params::ITERATIONS, "deriving cipher key material");

        let mut stream = Zeroizing::new([0u8; kdf_params::IV_LENGTH + kdf_params::KEY_LENGTH]);
        pbkdf2_hmac::<Sha1>(secret_one, &salt, kdf_params::ITERATIONS, stream.as_mut_slice());

        let mut material = DerivedKeyMaterial {
            iv: [0u8; kdf_params::IV_LENGTH],
            key: [0u8; kdf_params::KEY_LENGTH],
        };
        let (iv, key) = stream.split_at(kdf_params::IV_LENGTH);
        material.iv.copy_from_slice(iv);
        material.key.copy_from_slice(key);

        Ok(material)
    }
}

impl Default for KeyDerivation {
    /// Uses the legacy pepper so previously produced ciphertext decrypts.
    fn default() -> Self {
        Self {
            pepper: Pepper::legacy(),
        }
    }
}
