//! Wire shapes of request and response bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An inbound request body in one of the three accepted forms.
///
/// Variants are tried in order, so a body is only treated as plaintext when
/// it matches neither secured form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    /// AES-GCM ciphertext and IV, both base64.
    Encrypted { token: String, data: String, iv: String },
    /// A JSON document serialized to a string, with its hex HMAC.
    ///
    /// The HMAC covers the exact UTF-8 bytes of `payload`, so no
    /// canonicalization is needed on either side.
    Signed {
        payload: String,
        hmac: String,
        token: String,
    },
    Plain(Value),
}

/// An outbound response body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outbound {
    Encrypted {
        encrypted: bool,
        data: String,
        iv: String,
    },
    Plain(Value),
}

impl Outbound {
    pub fn encrypted(data: String, iv: String) -> Self {
        Outbound::Encrypted {
            encrypted: true,
            data,
            iv,
        }
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self, Outbound::Encrypted { .. })
    }
}
