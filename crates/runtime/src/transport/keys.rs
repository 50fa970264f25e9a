//! Per-session key material.
//!
//! Keys live only in memory for the lifetime of a session. Issuing again for
//! the same session rotates both key and token; the previous token stops
//! resolving immediately.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::RngCore;

use super::TransportError;
use crate::types::SessionUid;

pub const KEY_LEN: usize = 32;
const TOKEN_LEN: usize = 24;

/// 256-bit symmetric key.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey([u8; KEY_LEN]);

impl SessionKey {
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0)
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

/// Opaque token presented with every secured request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug)]
pub struct KeyMaterial {
    pub token: SessionToken,
    pub key: SessionKey,
}

#[derive(Default)]
struct Inner {
    by_session: HashMap<SessionUid, KeyMaterial>,
    by_token: HashMap<SessionToken, SessionUid>,
}

/// Maps session uids to key material and tokens back to sessions.
#[derive(Default)]
pub struct SessionKeyRegistry {
    inner: RwLock<Inner>,
}

impl SessionKeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, uid: &SessionUid) -> Result<KeyMaterial, TransportError> {
        let material = KeyMaterial {
            token: SessionToken::generate(),
            key: SessionKey::generate(),
        };

        let mut inner = self
            .inner
            .write()
            .map_err(|_| TransportError::KeyStorePoisoned)?;
        if let Some(previous) = inner.by_session.insert(uid.clone(), material.clone()) {
            inner.by_token.remove(&previous.token);
        }
        inner.by_token.insert(material.token.clone(), uid.clone());
        Ok(material)
    }

    pub fn material(&self, uid: &SessionUid) -> Result<Option<KeyMaterial>, TransportError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| TransportError::KeyStorePoisoned)?;
        Ok(inner.by_session.get(uid).cloned())
    }

    /// The session a token was issued for, if it is still current.
    pub fn session_for(&self, token: &str) -> Result<Option<SessionUid>, TransportError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| TransportError::KeyStorePoisoned)?;
        Ok(inner.by_token.get(&SessionToken(token.to_owned())).cloned())
    }

    pub fn revoke(&self, uid: &SessionUid) -> Result<(), TransportError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| TransportError::KeyStorePoisoned)?;
        if let Some(previous) = inner.by_session.remove(uid) {
            inner.by_token.remove(&previous.token);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reissue_rotates_token() {
        let registry = SessionKeyRegistry::new();
        let uid = SessionUid::from("s");
        let first = registry.issue(&uid).unwrap();
        let second = registry.issue(&uid).unwrap();

        assert_ne!(first.token, second.token);
        assert_ne!(first.key, second.key);
        assert_eq!(registry.session_for(first.token.as_str()).unwrap(), None);
        assert_eq!(
            registry.session_for(second.token.as_str()).unwrap(),
            Some(uid.clone())
        );
    }

    #[test]
    fn keys_are_never_shared_between_sessions() {
        let registry = SessionKeyRegistry::new();
        let a = registry.issue(&SessionUid::from("a")).unwrap();
        let b = registry.issue(&SessionUid::from("b")).unwrap();
        assert_ne!(a.key, b.key);
    }

    #[test]
    fn revoke_drops_material_and_token() {
        let registry = SessionKeyRegistry::new();
        let uid = SessionUid::from("s");
        let material = registry.issue(&uid).unwrap();
        registry.revoke(&uid).unwrap();
        assert!(registry.material(&uid).unwrap().is_none());
        assert!(registry.session_for(material.token.as_str()).unwrap().is_none());
    }
}
