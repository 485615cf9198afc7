use crate::error::{Error, Result};
use std::borrow::Borrow;
use std::fmt;

const MAX_NAME_LEN: usize = 256;

fn validate_name(value: &str, kind: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidId(format!("{kind} must not be empty")));
    }
    if trimmed.len() > MAX_NAME_LEN {
        return Err(Error::InvalidId(format!(
            "{kind} length must be <= {MAX_NAME_LEN}"
        )));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(Error::InvalidId(format!(
            "{kind} contains control characters"
        )));
    }
    Ok(trimmed.to_string())
}

macro_rules! define_id_type {
    ($(#[$doc:meta])* $name:ident, $kind:expr) => {
        $(#[$doc])*
        #[derive(Clone, Debug, Eq, PartialEq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            /// Creates a validated identifier.
            pub fn new(value: impl AsRef<str>) -> Result<Self> {
                validate_name(value.as_ref(), $kind).map(Self)
            }

            /// Creates an identifier from a trusted string without validation.
            pub fn from_string(value: String) -> Self {
                Self(value)
            }

            /// Returns the underlying string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<&str> for $name {
            type Error = Error;

            fn try_from(value: &str) -> Result<Self> {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::from_string(value)
            }
        }
    };
}

define_id_type!(
    /// Inventory item name; the catalog's unique key.
    ItemName,
    "item name"
);
define_id_type!(
    /// Email or username a session or transaction is attributed to.
    Identity,
    "identity"
);
define_id_type!(
    /// Backend-assigned transaction identifier.
    TransactionId,
    "transaction id"
);

/// Opaque session token issued by the backend.
///
/// The client never inspects or validates the token; it is stored, echoed
/// back on every authenticated call, and invalidated backend-side on logout.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AuthToken(String);

impl AuthToken {
    /// Wraps a token string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the underlying string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AuthToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for AuthToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for AuthToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Caller authorization tier.
///
/// The level is always a value the backend returned for a `(token, identity)`
/// pair; the client never upgrades its own level.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Level {
    /// No session, or a token the backend rejected.
    #[default]
    Anonymous,
    /// Authenticated member of the organization.
    Member,
    /// Administrator.
    Admin,
}

impl Level {
    /// Maps a backend tier number onto a level.
    ///
    /// Tiers above 2 are clamped to `Admin`; the UI only ever distinguishes
    /// "above zero" and "above one".
    pub fn from_tier(tier: u8) -> Self {
        match tier {
            0 => Self::Anonymous,
            1 => Self::Member,
            _ => Self::Admin,
        }
    }

    /// Returns the numeric tier.
    pub fn tier(self) -> u8 {
        match self {
            Self::Anonymous => 0,
            Self::Member => 1,
            Self::Admin => 2,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Anonymous => "anonymous",
            Self::Member => "member",
            Self::Admin => "admin",
        };
        f.write_str(label)
    }
}
