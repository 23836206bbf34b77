//! AES-256-CBC string encryption keyed by two secrets.
//!
//! There is no IV or salt in the payload: both are re-derived from the two
//! secrets on every call, so the output is deterministic for a given
//! plaintext and secret pair.

use crate::crypto::kdf::{DerivedKeyMaterial, KeyDerivation};
use crate::error::{ensure_not_blank, ensure_not_empty, Error, Result};
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zeroize::{Zeroize, Zeroizing};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES-256-CBC with PKCS7 padding and PBKDF2-derived IV/key.
#[derive(Debug, Clone, Default)]
pub struct SymmetricCipher {
    kdf: KeyDerivation,
}

impl SymmetricCipher {
    /// Create a cipher using the given key derivation.
    pub fn new(kdf: KeyDerivation) -> Self {
        Self { kdf }
    }

    /// Encrypt raw bytes.
    pub fn encrypt_bytes(
        &self,
        plaintext: &[u8],
        secret_one: &[u8],
        secret_two: &[u8],
    ) -> Result<Vec<u8>> {
        let material = self.kdf.derive(secret_one, secret_two)?;
        Ok(encrypt_with_material(plaintext, &material))
    }

    /// Decrypt raw bytes produced by [`encrypt_bytes`](Self::encrypt_bytes).
    ///
    /// Any failure (wrong secrets, bad padding, truncated input) surfaces as
    /// the same [`Error::Cryptographic`].
    pub fn decrypt_bytes(
        &self,
        ciphertext: &[u8],
        secret_one: &[u8],
        secret_two: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        ensure_not_empty(ciphertext, "ciphertext")?;
        let material = self.kdf.derive(secret_one, secret_two)?;
        decrypt_with_material(ciphertext, &material)
    }

    /// Encrypt a string; returns base64 ciphertext.
    pub fn encrypt_string(
        &self,
        plaintext: &str,
        secret_one: &[u8],
        secret_two: &[u8],
    ) -> Result<String> {
        ensure_not_blank(plaintext, "plaintext")?;
        ensure_not_empty(secret_one, "secret_one")?;
        ensure_not_empty(secret_two, "secret_two")?;

        let ciphertext = self.encrypt_bytes(plaintext.as_bytes(), secret_one, secret_two)?;
        Ok(STANDARD.encode(ciphertext))
    }

    /// Encrypt a string the caller gives up, wiping its buffer afterwards.
    ///
    /// The wipe is best effort: it clears this allocation only, not copies
    /// the caller may have made earlier.
    pub fn encrypt_string_owned(
        &self,
        plaintext: String,
        secret_one: &[u8],
        secret_two: &[u8],
    ) -> Result<String> {
        let plaintext = Zeroizing::new(plaintext);
        self.encrypt_string(&plaintext, secret_one, secret_two)
    }

    /// Decrypt base64 ciphertext back into a string.
    pub fn decrypt_string(
        &self,
        ciphertext_b64: &str,
        secret_one: &[u8],
        secret_two: &[u8],
    ) -> Result<String> {
        ensure_not_blank(ciphertext_b64, "ciphertext")?;
        ensure_not_empty(secret_one, "secret_one")?;
        ensure_not_empty(secret_two, "secret_two")?;

        let ciphertext = STANDARD.decode(ciphertext_b64.trim())?;
        if ciphertext.is_empty() {
            return Err(Error::Format("ciphertext decodes to nothing".to_string()));
        }

        let plaintext = self.decrypt_bytes(&ciphertext, secret_one, secret_two)?;
        match String::from_utf8(plaintext.to_vec()) {
            Ok(text) => Ok(text),
            Err(e) => {
                e.into_bytes().zeroize();
                tracing::warn!("decrypted payload is not valid UTF-8");
                Err(Error::Cryptographic)
            }
        }
    }
}

fn encrypt_with_material(plaintext: &[u8], material: &DerivedKeyMaterial) -> Vec<u8> {
    let ciphertext = Aes256CbcEnc::new(material.key().into(), material.iv().into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    tracing::debug!(
        plaintext_len = plaintext.len(),
        ciphertext_len = ciphertext.len(),
        "encrypted payload"
    );
    ciphertext
}

fn decrypt_with_material(
    ciphertext: &[u8],
    material: &DerivedKeyMaterial,
) -> Result<Zeroizing<Vec<u8>>> {
    Aes256CbcDec::new(material.key().into(), material.iv().into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| {
            tracing::warn!(ciphertext_len = ciphertext.len(), "decryption failed");
            Error::Cryptographic
        })
}

/// Encrypt a string with the default (legacy-peppered) key derivation.
pub fn encrypt_string(plaintext: &str, secret_one: &[u8], secret_two: &[u8]) -> Result<String> {
    SymmetricCipher::default().encrypt_string(plaintext, secret_one, secret_two)
}

/// Decrypt a string with the default (legacy-peppered) key derivation.
pub fn decrypt_string(
    ciphertext_b64: &str,
    secret_one: &[u8],
    secret_two: &[u8],
) -> Result<String> {
    SymmetricCipher::default().decrypt_string(ciphertext_b64, secret_one, secret_two)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::secret::Pepper;

    const KEY_ONE: &str =
        "ZjcxZGI2M2RkYTg3YmQ1YzM4ZWQ4MWEwN2FmZjU4OGNmMmFhM2I0YjUyNzNhYTEzN2I5N2E0OWEyMzVlNDhhMg==";
    const KEY_TWO: &str =
        "OTA5MWI3NzRlMDkxYTY4ZjJmNTdlMDc0YTY0MzY1MGY1ZWMwZWE2ODc1NTU3Njk1NDU5NzUwMzFkNTUxYTNlYQ==";

    fn keys() -> (Vec<u8>, Vec<u8>) {
        (STANDARD.decode(KEY_ONE).unwrap(), STANDARD.decode(KEY_TWO).unwrap())
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let (one, two) = keys();
        for plaintext in [
            "1",
            "p@assW0Rd!",
            "097898787870973209384lsjallkajsd9q08lasdh;)()90skdj98q7sjc",
        ] {
            let encrypted = encrypt_string(plaintext, &one, &two).unwrap();
            assert!(!encrypted.is_empty());

            let decrypted = decrypt_string(&encrypted, &one, &two).unwrap();
            assert_eq!(decrypted, plaintext);
        }
    }

    #[test]
    fn test_different_keys_different_ciphertext() {
        let plaintext = "TEst123242";

        let first = encrypt_string(plaintext, b"asdasdasd", b"asdasdasd").unwrap();
        let second = encrypt_string(plaintext, b"asd324", b"asd324").unwrap();

        assert_ne!(first, second);
        assert!(first.len() >= plaintext.len());
        assert!(second.len() >= plaintext.len());
    }

    #[test]
    fn test_ciphertext_is_padded_to_block() {
        let (one, two) = keys();
        let cipher = SymmetricCipher::default();

        // A full block of input still gains a full block of padding.
        let ciphertext = cipher.encrypt_bytes(&[7u8; 16], &one, &two).unwrap();
        assert_eq!(ciphertext.len(), 32);

        let ciphertext = cipher.encrypt_bytes(b"abc", &one, &two).unwrap();
        assert_eq!(ciphertext.len(), 16);
    }

    #[test]
    fn test_deterministic_for_same_secrets() {
        let (one, two) = keys();
        let a = encrypt_string("same message", &one, &two).unwrap();
        let b = encrypt_string("same message", &one, &two).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unicode_roundtrip() {
        let (one, two) = keys();
        let plaintext = "wachtwoord \u{1F511} \u{00E9}\u{00E8}";
        let encrypted = encrypt_string(plaintext, &one, &two).unwrap();
        assert_eq!(decrypt_string(&encrypted, &one, &two).unwrap(), plaintext);
    }

    #[test]
    fn test_owned_variant_matches_borrowed() {
        let (one, two) = keys();
        let cipher = SymmetricCipher::default();

        let borrowed = cipher.encrypt_string("p@assW0Rd!", &one, &two).unwrap();
        let owned = cipher
            .encrypt_string_owned("p@assW0Rd!".to_string(), &one, &two)
            .unwrap();

        assert_eq!(borrowed, owned);
    }

    #[test]
    fn test_custom_pepper_is_not_interchangeable() {
        let (one, two) = keys();
        let custom = SymmetricCipher::new(KeyDerivation::new(Pepper::new(vec![1u8; 8]).unwrap()));

        let encrypted = custom.encrypt_string("secret", &one, &two).unwrap();
        assert_eq!(custom.decrypt_string(&encrypted, &one, &two).unwrap(), "secret");
        assert_ne!(encrypted, encrypt_string("secret", &one, &two).unwrap());
    }

    #[test]
    fn test_blank_arguments_rejected() {
        let (one, two) = keys();
        assert!(matches!(
            encrypt_string("   ", &one, &two),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            encrypt_string("text", &[], &two),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            decrypt_string("", &one, &two),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            decrypt_string("AAAA", &one, &[]),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_malformed_base64_is_format_error() {
        let (one, two) = keys();
        assert!(matches!(
            decrypt_string("not*base64", &one, &two),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_wrong_key_fails() {
        let (one, two) = keys();
        let encrypted = encrypt_string("Secret data", &one, &two).unwrap();

        // Wrong key yields either bad padding or garbage; both must be the
        // undifferentiated error, or at least never the original text.
        match decrypt_string(&encrypted, b"wrong", &two) {
            Err(Error::Cryptographic) => {}
            Ok(text) => assert_ne!(text, "Secret data"),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_truncated_ciphertext_fails() {
        let (one, two) = keys();
        let cipher = SymmetricCipher::default();
        let ciphertext = cipher.encrypt_bytes(b"Secret data here!", &one, &two).unwrap();

        let result = cipher.decrypt_bytes(&ciphertext[..ciphertext.len() - 1], &one, &two);
        assert!(matches!(result, Err(Error::Cryptographic)));
    }
}
