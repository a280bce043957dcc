use thiserror::Error;

use crate::escape::UnescapeError;

/// Failures raised by a [`Cipher`](crate::Cipher) implementation.
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("invalid transport encoding: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("ciphertext too short ({len} bytes)")]
    Truncated { len: usize },

    #[error("authentication failed (wrong secret or tampered payload)")]
    Authentication,

    #[error("sealing the plaintext failed")]
    Seal,

    #[error("plaintext is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("secret key must not be empty")]
    InvalidSecret,

    #[error("query unescape failed: {0}")]
    MalformedInput(#[from] UnescapeError),

    #[error("decrypt failed: {0}")]
    DecryptionFailed(#[source] CipherError),

    #[error("encrypt failed: {0}")]
    EncryptionFailed(#[source] CipherError),

    #[error("serialize failed: {0}")]
    SerializationFailed(#[source] serde_json::Error),

    #[error("deserialize failed: {0}")]
    DeserializationFailed(#[source] serde_json::Error),

    #[error("signed auth needs a non-empty `token` property")]
    MissingToken,
}

pub type Result<T, E = CryptoError> = std::result::Result<T, E>;
