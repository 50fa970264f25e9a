//! HMAC-SHA256 signing for signed-plaintext payloads.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::TransportError;
use super::keys::SessionKey;

type HmacSha256 = Hmac<Sha256>;

pub fn sign(payload: &[u8], key: &SessionKey) -> Result<Vec<u8>, TransportError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key.as_bytes())
        .map_err(|_| TransportError::EncryptFailed)?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Constant-time comparison of `tag` against the HMAC of `payload`.
pub fn verify(payload: &[u8], tag: &[u8], key: &SessionKey) -> bool {
    let Ok(mut mac) = <HmacSha256 as Mac>::new_from_slice(key.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(tag).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_verifies_under_same_key_only() {
        let key = SessionKey::generate();
        let tag = sign(b"payload", &key).unwrap();
        assert_eq!(tag.len(), 32);
        assert!(verify(b"payload", &tag, &key));
        assert!(!verify(b"payload", &tag, &SessionKey::generate()));
        assert!(!verify(b"payloae", &tag, &key));
    }
}
