//! Wrapper for sensitive attribute values.
//!
//! Certificate private keys and passphrases travel through the handlers as
//! [`Sensitive`] values so they never reach logs, debug output or persisted
//! state in clear text.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string wrapper that redacts its contents in Debug and Display and
/// serializes as a SHA-256 digest.
///
/// - Debug output shows `Sensitive([REDACTED])`
/// - Display output shows `[REDACTED]`
/// - Serialization writes the lowercase hex SHA-256 of the value, which is what
///   ends up in state
/// - Deserialization accepts the raw value
/// - Memory is zeroed when dropped
///
/// A value read back from persisted state is already a digest; build it with
/// [`Sensitive::from_state_hash`] so it is written back unchanged instead of
/// being hashed twice.
///
/// ```rust,ignore
/// let key = Sensitive::new("LS0tLS1CRUdJTi...");
/// println!("{:?}", key);      // Sensitive([REDACTED])
/// let raw = key.expose();      // only where the API call needs it
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Sensitive {
    value: String,
    #[zeroize(skip)]
    is_state_hash: bool,
}

impl Sensitive {
    /// Creates a new sensitive value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            is_state_hash: false,
        }
    }

    /// Wraps a digest previously written to state.
    pub fn from_state_hash(digest: impl Into<String>) -> Self {
        Self {
            value: digest.into(),
            is_state_hash: true,
        }
    }

    /// Exposes the underlying value. Never log the result.
    ///
    /// For a value built with [`Sensitive::from_state_hash`] this is the digest.
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// True if this holds a state digest rather than the secret itself.
    pub fn is_state_hash(&self) -> bool {
        self.is_state_hash
    }

    /// Hex-encoded SHA-256 digest of the value, as stored in state.
    pub fn state_hash(&self) -> String {
        if self.is_state_hash {
            self.value.clone()
        } else {
            hex::encode(Sha256::digest(self.value.as_bytes()))
        }
    }

    /// Returns the length of the value without exposing it.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Returns true if the value is empty.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl Serialize for Sensitive {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.state_hash())
    }
}

impl<'de> Deserialize<'de> for Sensitive {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Sensitive::new(value))
    }
}

impl fmt::Debug for Sensitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sensitive([REDACTED])")
    }
}

impl fmt::Display for Sensitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

/// Values compare by digest, so a secret equals its own state hash.
impl PartialEq for Sensitive {
    fn eq(&self, other: &Self) -> bool {
        self.state_hash() == other.state_hash()
    }
}

impl Eq for Sensitive {}

impl From<String> for Sensitive {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Sensitive {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
