//! Data protection capability used to keep secrets wrapped between uses.

use crate::error::{Error, Result};
use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use rand::RngCore;
use std::fmt;
use zeroize::Zeroizing;

/// Nonce size for AES-GCM (96 bits).
const NONCE_SIZE: usize = 12;

/// Authentication tag size (128 bits).
const TAG_SIZE: usize = 16;

/// Wraps and unwraps opaque bytes.
///
/// Implementations must satisfy `unprotect(protect(x)) == x` for at least
/// the lifetime of the process. Failures should be reported as
/// [`Error::Cryptographic`].
pub trait DataProtector: Send + Sync {
    /// Wrap `plaintext`.
    fn protect(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Recover bytes previously passed to [`protect`](Self::protect).
    fn unprotect(&self, protected: &[u8]) -> Result<Zeroizing<Vec<u8>>>;
}

impl<P: DataProtector + ?Sized> DataProtector for std::sync::Arc<P> {
    fn protect(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        (**self).protect(plaintext)
    }

    fn unprotect(&self, protected: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        (**self).unprotect(protected)
    }
}

/// In-process protector: AES-256-GCM under a key that lives only as long
/// as this value.
///
/// Output is `nonce (12 bytes) || ciphertext || tag (16 bytes)`. The
/// purpose string is bound as associated data, so blobs protected for one
/// purpose do not unprotect under another.
pub struct EphemeralProtector {
    cipher: Aes256Gcm,
    purpose: String,
}

impl EphemeralProtector {
    /// Create a protector with a fresh random key.
    pub fn new(purpose: impl Into<String>) -> Self {
        let mut key = Zeroizing::new([0u8; 32]);
        rand::thread_rng().fill_bytes(key.as_mut_slice());
        let cipher = Aes256Gcm::new(key.as_slice().into());

        Self {
            cipher,
            purpose: purpose.into(),
        }
    }

    /// A protector sharing this key but bound to a different purpose.
    pub fn with_purpose(&self, purpose: impl Into<String>) -> Self {
        Self {
            cipher: self.cipher.clone(),
            purpose: purpose.into(),
        }
    }

    /// The purpose this protector is scoped to.
    pub fn purpose(&self) -> &str {
        &self.purpose
    }
}

impl fmt::Debug for EphemeralProtector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralProtector")
            .field("purpose", &self.purpose)
            .finish_non_exhaustive()
    }
}

impl DataProtector for EphemeralProtector {
    fn protect(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let payload = Payload {
            msg: plaintext,
            aad: self.purpose.as_bytes(),
        };
        let ciphertext = self
            .cipher
            .encrypt(nonce, payload)
            .map_err(|_| Error::Cryptographic)?;

        let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&ciphertext);

        Ok(result)
    }

    fn unprotect(&self, protected: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        if protected.len() < NONCE_SIZE + TAG_SIZE {
            return Err(Error::Cryptographic);
        }

        let (nonce_bytes, ciphertext) = protected.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);
        let payload = Payload {
            msg: ciphertext,
            aad: self.purpose.as_bytes(),
        };

        self.cipher
            .decrypt(nonce, payload)
            .map(Zeroizing::new)
            .map_err(|_| Error::Cryptographic)
    }
}
