use thiserror::Error;

/// Transport failures. Every variant is a client-input error (400) except
/// `KeyStorePoisoned`.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("plaintext bodies are not accepted in secured mode")]
    PlaintextRejected,

    #[error("no session key has been issued for this session")]
    NoSessionKey,

    #[error("session token does not match the issued token")]
    TokenMismatch,

    #[error("payload could not be decrypted")]
    DecryptFailed,

    #[error("payload may have been tampered")]
    SignatureMismatch,

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("encryption failed")]
    EncryptFailed,

    #[error("session key store lock was poisoned")]
    KeyStorePoisoned,
}

impl TransportError {
    /// Machine-readable reason code.
    pub const fn code(&self) -> &'static str {
        match self {
            TransportError::PlaintextRejected => "TRANSPORT_PLAINTEXT_REJECTED",
            TransportError::NoSessionKey => "TRANSPORT_NO_SESSION_KEY",
            TransportError::TokenMismatch => "TRANSPORT_TOKEN_MISMATCH",
            TransportError::DecryptFailed => "TRANSPORT_DECRYPT_FAILED",
            TransportError::SignatureMismatch => "TRANSPORT_SIGNATURE_MISMATCH",
            TransportError::MalformedEnvelope(_) => "TRANSPORT_MALFORMED_ENVELOPE",
            TransportError::MalformedPayload(_) => "TRANSPORT_MALFORMED_PAYLOAD",
            TransportError::EncryptFailed => "TRANSPORT_ENCRYPT_FAILED",
            TransportError::KeyStorePoisoned => "TRANSPORT_KEY_STORE_POISONED",
        }
    }

    /// True when the failure was caused by server state, not client input.
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            TransportError::EncryptFailed | TransportError::KeyStorePoisoned
        )
    }
}
