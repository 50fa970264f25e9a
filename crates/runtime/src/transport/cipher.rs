//! AES-256-GCM payload encryption.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;

use super::TransportError;
use super::keys::SessionKey;

/// GCM nonce length in bytes.
pub const IV_LEN: usize = 12;

/// Encrypts `plaintext` with a fresh random IV. Returns `(ciphertext, iv)`.
pub fn encrypt(plaintext: &[u8], key: &SessionKey) -> Result<(Vec<u8>, Vec<u8>), TransportError> {
    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| TransportError::EncryptFailed)?;

    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| TransportError::EncryptFailed)?;
    Ok((ciphertext, iv.to_vec()))
}

/// Decrypts and authenticates `ciphertext`. Any tampering fails.
pub fn decrypt(ciphertext: &[u8], iv: &[u8], key: &SessionKey) -> Result<Vec<u8>, TransportError> {
    if iv.len() != IV_LEN {
        return Err(TransportError::MalformedEnvelope(format!(
            "iv must be {IV_LEN} bytes"
        )));
    }
    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| TransportError::DecryptFailed)?;
    cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| TransportError::DecryptFailed)
}
