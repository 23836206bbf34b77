//! Reusable string encryption service that keeps its secrets wrapped.

use crate::crypto::cipher::SymmetricCipher;
use crate::crypto::protector::DataProtector;
use crate::crypto::secret::{SecretBytes, SecretMaterial};
use crate::error::{ensure_not_blank, Error, Result};
use std::fmt;
use zeroize::Zeroizing;

/// Purpose string for protectors handed to [`EnvelopeKeyService`].
pub const PROTECTOR_PURPOSE: &str = "EncryptionService";

/// Encrypts and decrypts strings without holding raw secrets between calls.
///
/// Construction consumes a [`SecretMaterial`] and immediately re-wraps both
/// secrets with the protector. Each call unwraps them, runs the cipher, and
/// drops (wipes) the raw bytes before returning.
///
/// Safe to share across threads once constructed.
pub struct EnvelopeKeyService<P: DataProtector> {
    protector: P,
    protected_one: Vec<u8>,
    protected_two: Vec<u8>,
    cipher: SymmetricCipher,
}

impl<P: DataProtector> EnvelopeKeyService<P> {
    /// Consume `secrets` and wrap them with `protector`.
    ///
    /// Fails with [`Error::ConsumedSecret`] if either slot was already read.
    pub fn new(secrets: SecretMaterial, protector: P) -> Result<Self> {
        Self::with_cipher(secrets, protector, SymmetricCipher::default())
    }

    /// Like [`new`](Self::new) but with a custom cipher configuration.
    pub fn with_cipher(
        secrets: SecretMaterial,
        protector: P,
        cipher: SymmetricCipher,
    ) -> Result<Self> {
        let (one, two) = secrets.into_parts()?;

        let protected_one = protector.protect(&one).map_err(|_| Error::Cryptographic)?;
        let protected_two = protector.protect(&two).map_err(|_| Error::Cryptographic)?;

        tracing::debug!("envelope key service initialized");

        Ok(Self {
            protector,
            protected_one,
            protected_two,
            cipher,
        })
    }

    fn unwrap_secrets(&self) -> Result<(SecretBytes, SecretBytes)> {
        let one = self
            .protector
            .unprotect(&self.protected_one)
            .map_err(|_| Error::Cryptographic)?;
        let two = self
            .protector
            .unprotect(&self.protected_two)
            .map_err(|_| Error::Cryptographic)?;
        Ok((one, two))
    }

    /// Encrypt a string; returns base64 ciphertext.
    pub fn encrypt_string(&self, plaintext: &str) -> Result<String> {
        ensure_not_blank(plaintext, "plaintext")?;

        let (one, two) = self.unwrap_secrets()?;
        self.cipher.encrypt_string(plaintext, &one, &two)
    }

    /// Encrypt a string the caller gives up, wiping its buffer afterwards.
    pub fn encrypt_string_owned(&self, plaintext: String) -> Result<String> {
        let plaintext = Zeroizing::new(plaintext);
        self.encrypt_string(&plaintext)
    }

    /// Decrypt base64 ciphertext produced with the same secrets.
    pub fn decrypt_string(&self, ciphertext_b64: &str) -> Result<String> {
        ensure_not_blank(ciphertext_b64, "ciphertext")?;

        let (one, two) = self.unwrap_secrets()?;
        self.cipher.decrypt_string(ciphertext_b64, &one, &two)
    }
}

impl<P: DataProtector> fmt::Debug for EnvelopeKeyService<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvelopeKeyService")
            .field("cipher", &self.cipher)
            .finish_non_exhaustive()
    }
}
