//! Cryptographic operations for saltcellar.
//!
//! This module provides:
//! - Single-use secret material and peppers
//! - PBKDF2-HMAC-SHA1 derivation of AES-256-CBC IV and key from two secrets
//! - A reusable envelope service that keeps secrets wrapped between calls
//! - PBKDF2-HMAC-SHA512 password hashing with salt and pepper

mod cipher;
mod envelope;
mod kdf;
mod password;
mod protector;
mod secret;

pub use cipher::{decrypt_string, encrypt_string, SymmetricCipher};
pub use envelope::{EnvelopeKeyService, PROTECTOR_PURPOSE};
pub use kdf::{DerivedKeyMaterial, KeyDerivation};
pub use password::{HashedPasswordRecord, PasswordHasher};
pub use protector::{DataProtector, EphemeralProtector};
pub use secret::{Pepper, SecretBytes, SecretMaterial};
