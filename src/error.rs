//! Error types for saltcellar.

use std::fmt;
use thiserror::Error;

/// Result type alias for saltcellar operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Identifies one of the two slots of a [`SecretMaterial`](crate::crypto::SecretMaterial).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSlot {
    /// The first secret, used as the PBKDF2 password.
    One,
    /// The second secret, used as the PBKDF2 salt (before peppering).
    Two,
}

impl fmt::Display for SecretSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretSlot::One => f.write_str("secret one"),
            SecretSlot::Two => f.write_str("secret two"),
        }
    }
}

/// Errors that can occur in saltcellar operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A blank string or empty buffer was passed where content is required.
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: &'static str,
    },

    /// A secret slot was read a second time.
    #[error("The {0} was already read once; create a new SecretMaterial instance")]
    ConsumedSecret(SecretSlot),

    /// Malformed base64 or a structurally invalid stored record.
    #[error("Format error: {0}")]
    Format(String),

    /// Cipher, derivation or protector failure.
    ///
    /// Deliberately carries no detail: wrong key, bad padding and corrupted
    /// ciphertext all look the same to the caller.
    #[error("Cryptographic operation failed")]
    Cryptographic,
}

impl Error {
    pub(crate) fn blank(name: &'static str) -> Self {
        Error::InvalidArgument {
            name,
            reason: "value cannot be blank",
        }
    }

    pub(crate) fn empty(name: &'static str) -> Self {
        Error::InvalidArgument {
            name,
            reason: "value cannot be an empty collection",
        }
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::Format(e.to_string())
    }
}

/// Fails with [`Error::InvalidArgument`] when `value` is empty or whitespace only.
pub(crate) fn ensure_not_blank(value: &str, name: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::blank(name));
    }
    Ok(())
}

/// Fails with [`Error::InvalidArgument`] when `value` is empty.
pub(crate) fn ensure_not_empty(value: &[u8], name: &'static str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::empty(name));
    }
    Ok(())
}
