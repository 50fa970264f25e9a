//! Transport security for the client/server channel.
//!
//! The deployment picks one [`TransportMode`] at construction. In `Secured`
//! mode request bodies must be either AES-256-GCM encrypted with the
//! per-session key, or plaintext signed with HMAC-SHA256 under that key.
//! Both forms carry the opaque token issued alongside the key.

mod cipher;
mod envelope;
mod error;
mod keys;
mod signing;

pub use cipher::{decrypt, encrypt};
pub use envelope::{Envelope, Outbound};
pub use error::TransportError;
pub use keys::{KeyMaterial, SessionKey, SessionKeyRegistry, SessionToken};
pub use signing::{sign, verify};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;
use tracing::{debug, info};

use crate::types::SessionUid;

/// Deployment-wide transport mode.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TransportMode {
    /// Debug only: payloads are exchanged as-is.
    Plaintext,
    #[default]
    Secured,
}

/// Opens inbound envelopes and seals outbound payloads.
pub struct TransportLayer {
    mode: TransportMode,
    keys: SessionKeyRegistry,
}

impl TransportLayer {
    pub fn new(mode: TransportMode) -> Self {
        Self {
            mode,
            keys: SessionKeyRegistry::new(),
        }
    }

    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    pub fn keys(&self) -> &SessionKeyRegistry {
        &self.keys
    }

    /// Issues fresh key material for `uid`, replacing any previous token.
    pub fn issue_session_key(&self, uid: &SessionUid) -> Result<KeyMaterial, TransportError> {
        let material = self.keys.issue(uid)?;
        info!(session = %uid, "issued session key");
        Ok(material)
    }

    pub fn revoke(&self, uid: &SessionUid) -> Result<(), TransportError> {
        self.keys.revoke(uid)
    }

    /// Decrypts or verifies an inbound body for session `uid`.
    pub fn open(&self, uid: &SessionUid, envelope: Envelope) -> Result<Value, TransportError> {
        match envelope {
            Envelope::Encrypted { token, data, iv } => {
                let material = self.material_for_token(uid, &token)?;
                let ciphertext = decode(&data, "data")?;
                let iv = decode(&iv, "iv")?;
                let plaintext = decrypt(&ciphertext, &iv, &material.key)?;
                debug!(session = %uid, bytes = plaintext.len(), "decrypted request body");
                serde_json::from_slice(&plaintext)
                    .map_err(|e| TransportError::MalformedPayload(e.to_string()))
            }
            Envelope::Signed {
                payload,
                hmac,
                token,
            } => {
                let material = self.material_for_signed(uid, &token)?;
                let tag = hex::decode(&hmac)
                    .map_err(|_| TransportError::MalformedEnvelope("hmac is not hex".into()))?;
                if !verify(payload.as_bytes(), &tag, &material.key) {
                    return Err(TransportError::SignatureMismatch);
                }
                serde_json::from_str(&payload)
                    .map_err(|e| TransportError::MalformedPayload(e.to_string()))
            }
            Envelope::Plain(value) => match self.mode {
                TransportMode::Plaintext => Ok(value),
                TransportMode::Secured => Err(TransportError::PlaintextRejected),
            },
        }
    }

    /// Encrypts `payload` when secured and key material exists for `uid`.
    pub fn seal(&self, uid: &SessionUid, payload: Value) -> Result<Outbound, TransportError> {
        if self.mode == TransportMode::Plaintext {
            return Ok(Outbound::Plain(payload));
        }
        let Some(material) = self.keys.material(uid)? else {
            return Ok(Outbound::Plain(payload));
        };

        let bytes = serde_json::to_vec(&payload)
            .map_err(|e| TransportError::MalformedPayload(e.to_string()))?;
        let (ciphertext, iv) = encrypt(&bytes, &material.key)?;
        Ok(Outbound::encrypted(
            BASE64.encode(ciphertext),
            BASE64.encode(iv),
        ))
    }

    fn material_for_token(
        &self,
        uid: &SessionUid,
        token: &str,
    ) -> Result<KeyMaterial, TransportError> {
        let material = self
            .keys
            .material(uid)?
            .ok_or(TransportError::NoSessionKey)?;
        if material.token.as_str() != token {
            return Err(TransportError::TokenMismatch);
        }
        Ok(material)
    }

    /// Signed bodies resolve their key through the token, which must have
    /// been issued for `uid`.
    fn material_for_signed(
        &self,
        uid: &SessionUid,
        token: &str,
    ) -> Result<KeyMaterial, TransportError> {
        match self.keys.session_for(token)? {
            Some(owner) if &owner == uid => self
                .keys
                .material(uid)?
                .ok_or(TransportError::NoSessionKey),
            Some(_) | None => Err(TransportError::TokenMismatch),
        }
    }
}

fn decode(value: &str, field: &str) -> Result<Vec<u8>, TransportError> {
    BASE64
        .decode(value)
        .map_err(|_| TransportError::MalformedEnvelope(format!("{field} is not base64")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn uid() -> SessionUid {
        SessionUid::from("s-1")
    }

    #[test]
    fn secured_mode_rejects_bare_plaintext() {
        let layer = TransportLayer::new(TransportMode::Secured);
        let err = layer
            .open(&uid(), Envelope::Plain(json!({"turn": 1})))
            .unwrap_err();
        assert!(matches!(err, TransportError::PlaintextRejected));
    }

    #[test]
    fn plaintext_mode_passes_bodies_through() {
        let layer = TransportLayer::new(TransportMode::Plaintext);
        let body = json!({"turn": 2});
        assert_eq!(layer.open(&uid(), Envelope::Plain(body.clone())).unwrap(), body);
        assert!(matches!(layer.seal(&uid(), body).unwrap(), Outbound::Plain(_)));
    }

    #[test]
    fn sealed_payload_opens_with_issued_token() {
        let layer = TransportLayer::new(TransportMode::Secured);
        let material = layer.issue_session_key(&uid()).unwrap();
        let body = json!({"turn": 3, "phase": "enemy"});

        let Outbound::Encrypted { data, iv, .. } = layer.seal(&uid(), body.clone()).unwrap() else {
            panic!("expected encrypted response");
        };
        let envelope = Envelope::Encrypted {
            token: material.token.to_string(),
            data,
            iv,
        };
        assert_eq!(layer.open(&uid(), envelope).unwrap(), body);
    }

    #[test]
    fn foreign_token_is_rejected() {
        let layer = TransportLayer::new(TransportMode::Secured);
        let other = SessionUid::from("s-2");
        layer.issue_session_key(&uid()).unwrap();
        let foreign = layer.issue_session_key(&other).unwrap();

        let payload = r#"{"turn":1}"#.to_owned();
        let hmac = hex::encode(sign(payload.as_bytes(), &foreign.key).unwrap());
        let err = layer
            .open(
                &uid(),
                Envelope::Signed {
                    payload,
                    hmac,
                    token: foreign.token.to_string(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, TransportError::TokenMismatch));
    }

    #[test]
    fn tampered_signed_payload_is_rejected() {
        let layer = TransportLayer::new(TransportMode::Secured);
        let material = layer.issue_session_key(&uid()).unwrap();
        let hmac = hex::encode(sign(br#"{"hp":10}"#, &material.key).unwrap());

        let err = layer
            .open(
                &uid(),
                Envelope::Signed {
                    payload: r#"{"hp":99}"#.into(),
                    hmac,
                    token: material.token.to_string(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, TransportError::SignatureMismatch));
        assert_eq!(err.to_string(), "payload may have been tampered");
    }
}
