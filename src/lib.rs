//! Saltcellar
//!
//! Small cryptographic core for applications that need to encrypt short
//! strings with two long-lived secrets and to store peppered password hashes.
//!
//! # Features
//!
//! - **Single-use secrets**: [`SecretMaterial`] hands each raw secret out once
//! - **String encryption**: AES-256-CBC/PKCS7 with IV and key derived by
//!   PBKDF2-HMAC-SHA1 from the two secrets and a pepper
//! - **Envelope service**: [`EnvelopeKeyService`] keeps the secrets wrapped by a
//!   [`DataProtector`] and unwraps them only for the duration of a call
//! - **Password hashing**: PBKDF2-HMAC-SHA512, random salt, application pepper,
//!   constant-time verification
//!
//! Secret buffers are wiped on drop. Treat that as defence in depth: the
//! allocator, the OS and the caller may still hold copies.
//!
//! # Example
//!
//! ```rust
//! use saltcellar::{EnvelopeKeyService, EphemeralProtector, SecretMaterial, PROTECTOR_PURPOSE};
//!
//! let secrets = SecretMaterial::from_base64("Zmlyc3RrZXk=", "c2Vjb25ka2V5").unwrap();
//! let service =
//!     EnvelopeKeyService::new(secrets, EphemeralProtector::new(PROTECTOR_PURPOSE)).unwrap();
//!
//! let encrypted = service.encrypt_string("p@assW0Rd!").unwrap();
//! assert_eq!(service.decrypt_string(&encrypted).unwrap(), "p@assW0Rd!");
//! ```

pub mod config;
pub mod crypto;
pub mod error;

pub use config::SecurityConfig;
pub use crypto::{
    DataProtector, EnvelopeKeyService, EphemeralProtector, HashedPasswordRecord, PasswordHasher,
    Pepper, SecretMaterial, SymmetricCipher, PROTECTOR_PURPOSE,
};
pub use error::{Error, Result, SecretSlot};
