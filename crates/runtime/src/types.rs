//! Identifier types used throughout the runtime.
//!
//! Internal numeric keys never leave the server; clients only ever see the
//! opaque uid types.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Internal numeric session key. Never exposed on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

opaque_id!(
    /// Opaque external session identifier.
    SessionUid
);

opaque_id!(
    /// Opaque external battle identifier.
    BattleUid
);

opaque_id!(
    /// Authenticated account that owns sessions and characters.
    OwnerId
);

opaque_id!(
    /// Character that receives experience and gold.
    CharacterId
);

impl SessionUid {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl BattleUid {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Caller identity attached to every request.
///
/// `owner` is `None` when the transport layer could not authenticate the
/// caller; every service operation then fails with 401.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub owner: Option<OwnerId>,
}

impl RequestContext {
    pub fn owner(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(OwnerId::new(owner)),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}
