//! Single-use secret material and peppers.
//!
//! Buffers here are wiped on drop via `zeroize`. This is defence in depth:
//! copies made by the allocator on reallocation, swap, or core dumps are
//! outside of what a library can reach.

use crate::config::kdf_params;
use crate::error::{ensure_not_blank, ensure_not_empty, Error, Result, SecretSlot};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Raw secret bytes, wiped when dropped.
pub type SecretBytes = Zeroizing<Vec<u8>>;

/// Two raw secrets, each of which can be read out exactly once.
///
/// Reading a slot moves its bytes to the caller; the container no longer
/// holds them. A second read of the same slot fails with
/// [`Error::ConsumedSecret`]. Use [`SecretMaterial::into_parts`] to take both
/// at once and make reuse impossible at compile time.
///
/// Not meant to be shared: `take_*` needs `&mut self`.
pub struct SecretMaterial {
    one: Option<SecretBytes>,
    two: Option<SecretBytes>,
}

impl SecretMaterial {
    /// Decode both secrets from base64.
    ///
    /// Blank strings and secrets that decode to nothing are rejected with
    /// [`Error::InvalidArgument`]; malformed base64 with [`Error::Format`].
    pub fn from_base64(secret_one: &str, secret_two: &str) -> Result<Self> {
        ensure_not_blank(secret_one, "secret_one")?;
        ensure_not_blank(secret_two, "secret_two")?;

        let one = Zeroizing::new(STANDARD.decode(secret_one.trim())?);
        let two = Zeroizing::new(STANDARD.decode(secret_two.trim())?);

        Self::from_bytes(one, two)
    }

    /// Wrap two raw secrets.
    pub fn from_bytes(
        secret_one: impl Into<SecretBytes>,
        secret_two: impl Into<SecretBytes>,
    ) -> Result<Self> {
        let one = secret_one.into();
        let two = secret_two.into();
        ensure_not_empty(&one, "secret_one")?;
        ensure_not_empty(&two, "secret_two")?;

        Ok(Self {
            one: Some(one),
            two: Some(two),
        })
    }

    /// Take the first secret. Fails on every call after the first.
    pub fn take_secret_one(&mut self) -> Result<SecretBytes> {
        self.one.take().ok_or(Error::ConsumedSecret(SecretSlot::One))
    }

    /// Take the second secret. Fails on every call after the first.
    pub fn take_secret_two(&mut self) -> Result<SecretBytes> {
        self.two.take().ok_or(Error::ConsumedSecret(SecretSlot::Two))
    }

    /// Whether the given slot still holds its secret.
    pub fn is_available(&self, slot: SecretSlot) -> bool {
        match slot {
            SecretSlot::One => self.one.is_some(),
            SecretSlot::Two => self.two.is_some(),
        }
    }

    /// Consume the container and return both secrets.
    ///
    /// Fails if either slot was already taken.
    pub fn into_parts(mut self) -> Result<(SecretBytes, SecretBytes)> {
        let one = self.take_secret_one()?;
        let two = self.take_secret_two()?;
        Ok((one, two))
    }
}

impl fmt::Debug for SecretMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = |available: bool| if available { "available" } else { "consumed" };
        f.debug_struct("SecretMaterial")
            .field("secret_one", &state(self.one.is_some()))
            .field("secret_two", &state(self.two.is_some()))
            .finish()
    }
}

/// An application-wide secret appended to salts before derivation.
///
/// Always non-empty.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Pepper(Vec<u8>);

impl Pepper {
    /// Create a pepper from raw bytes. Empty input is rejected.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        ensure_not_empty(&bytes, "pepper")?;
        Ok(Self(bytes))
    }

    /// Decode a pepper from base64.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        ensure_not_blank(encoded, "pepper")?;
        Self::new(STANDARD.decode(encoded.trim())?)
    }

    /// The fixed pepper the symmetric cipher has always used.
    pub fn legacy() -> Self {
        Self(kdf_params::LEGACY_PEPPER.to_vec())
    }

    /// The raw pepper bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Concatenate `salt || pepper` into a buffer that is wiped on drop.
    pub(crate) fn season(&self, salt: &[u8]) -> Zeroizing<Vec<u8>> {
        let mut seasoned = Zeroizing::new(Vec::with_capacity(salt.len() + self.0.len()));
        seasoned.extend_from_slice(salt);
        seasoned.extend_from_slice(&self.0);
        seasoned
    }
}

impl fmt::Debug for Pepper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pepper({} bytes)", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // base64("firstkey")
    const FIRST_KEY: &str = "Zmlyc3RrZXk=";

    #[test]
    fn test_take_secret_one_once() {
        let mut secrets = SecretMaterial::from_base64(FIRST_KEY, FIRST_KEY).unwrap();

        let one = secrets.take_secret_one().unwrap();
        assert_eq!(one.as_slice(), b"firstkey");

        assert!(matches!(
            secrets.take_secret_one(),
            Err(Error::ConsumedSecret(SecretSlot::One))
        ));
    }

    #[test]
    fn test_take_secret_two_once() {
        let mut secrets = SecretMaterial::from_base64(FIRST_KEY, FIRST_KEY).unwrap();

        let two = secrets.take_secret_two().unwrap();
        assert_eq!(two.as_slice(), b"firstkey");

        assert!(matches!(
            secrets.take_secret_two(),
            Err(Error::ConsumedSecret(SecretSlot::Two))
        ));
    }

    #[test]
    fn test_slots_are_independent() {
        let mut secrets = SecretMaterial::from_base64(FIRST_KEY, "c2Vjb25ka2V5").unwrap();

        secrets.take_secret_one().unwrap();
        assert!(!secrets.is_available(SecretSlot::One));
        assert!(secrets.is_available(SecretSlot::Two));

        let two = secrets.take_secret_two().unwrap();
        assert_eq!(two.as_slice(), b"secondkey");
    }

    #[test]
    fn test_into_parts_after_partial_take_fails() {
        let mut secrets = SecretMaterial::from_base64(FIRST_KEY, FIRST_KEY).unwrap();
        secrets.take_secret_two().unwrap();

        assert!(matches!(
            secrets.into_parts(),
            Err(Error::ConsumedSecret(SecretSlot::Two))
        ));
    }

    #[test]
    fn test_blank_input_rejected() {
        assert!(matches!(
            SecretMaterial::from_base64("   ", FIRST_KEY),
            Err(Error::InvalidArgument { name: "secret_one", .. })
        ));
        assert!(matches!(
            SecretMaterial::from_base64(FIRST_KEY, ""),
            Err(Error::InvalidArgument { name: "secret_two", .. })
        ));
    }

    #[test]
    fn test_malformed_base64_rejected() {
        assert!(matches!(
            SecretMaterial::from_base64("@@@", FIRST_KEY),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_empty_bytes_rejected() {
        assert!(SecretMaterial::from_bytes(Vec::new(), b"x".to_vec()).is_err());
    }

    #[test]
    fn test_debug_hides_bytes() {
        let mut secrets = SecretMaterial::from_base64(FIRST_KEY, FIRST_KEY).unwrap();
        secrets.take_secret_one().unwrap();
        let rendered = format!("{:?}", secrets);
        assert!(rendered.contains("consumed"));
        assert!(rendered.contains("available"));
        assert!(!rendered.contains("firstkey"));
    }

    #[test]
    fn test_pepper_season() {
        let pepper = Pepper::new(vec![9, 9]).unwrap();
        assert_eq!(pepper.season(&[1, 2, 3]).as_slice(), &[1, 2, 3, 9, 9]);
        assert!(Pepper::new(Vec::new()).is_err());
    }
}
