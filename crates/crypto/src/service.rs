use {
    secrecy::Secret,
    serde::{Serialize, de::DeserializeOwned},
    tracing::debug,
};

use crate::{
    cipher::{Cipher, SecretCipher, TransportEncoding},
    credentials::{Credential, decode_credentials, open_credential},
    error::{CryptoError, Result},
    escape::query_unescape,
};

/// Encoding used for everything this service encrypts itself.
pub(crate) const FACADE_ENCODING: TransportEncoding = TransportEncoding::RawUrlSafe;

/// Encrypt/decrypt façade bound to one app secret for one session.
#[derive(Debug, Clone)]
pub struct CryptoService<C = SecretCipher> {
    pub(crate) cipher: C,
}

impl CryptoService {
    pub fn new(secret: &str) -> Result<Self> {
        Ok(Self::with_cipher(SecretCipher::new(secret)?))
    }

    pub fn from_secret(secret: &Secret<String>) -> Result<Self> {
        Ok(Self::with_cipher(SecretCipher::from_secret(secret)?))
    }
}

impl<C: Cipher> CryptoService<C> {
    pub fn with_cipher(cipher: C) -> Self {
        Self { cipher }
    }

    /// Decode the `result` parameter delivered to the callback listener.
    pub fn decrypt_credentials(&self, result: &str) -> Result<Credential> {
        decode_credentials(&self.cipher, result)
    }

    /// Decode a result copied by hand from the connector's redirect.
    ///
    /// The value may or may not still be URL-escaped; when unescaping fails
    /// the text is used as-is.
    pub fn decrypt_connector_result(&self, result: &str) -> Result<Credential> {
        let ciphertext = query_unescape(result).unwrap_or_else(|e| {
            debug!(error = %e, "result is not query-escaped, using raw text");
            result.to_string()
        });
        open_credential(&self.cipher, &ciphertext, TransportEncoding::Default)
    }

    /// Decode the body returned by a token refresh (standard base64).
    pub fn decrypt_refresh_result(&self, result: &str) -> Result<Credential> {
        open_credential(&self.cipher, result, TransportEncoding::Standard)
    }

    pub fn encrypt(&self, msg: &str) -> Result<String> {
        self.cipher
            .encrypt(msg.as_bytes(), FACADE_ENCODING)
            .map_err(CryptoError::EncryptionFailed)
    }

    pub fn decrypt(&self, enc: &str) -> Result<String> {
        self.cipher
            .decrypt_string(enc, FACADE_ENCODING)
            .map_err(CryptoError::DecryptionFailed)
    }

    /// Serialize `value` to JSON, then [`encrypt`](Self::encrypt) it.
    pub fn encrypt_struct<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let json = serde_json::to_string(value).map_err(CryptoError::SerializationFailed)?;
        self.encrypt(&json)
    }

    /// [`decrypt`](Self::decrypt), then deserialize the JSON into `T`.
    pub fn decrypt_to_struct<T: DeserializeOwned>(&self, enc: &str) -> Result<T> {
        let json = self.decrypt(enc)?;
        serde_json::from_str(&json).map_err(CryptoError::DeserializationFailed)
    }
}
