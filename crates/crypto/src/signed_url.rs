use serde::{Deserialize, Serialize};

use crate::{
    cipher::Cipher,
    credentials::null_as_default,
    error::{CryptoError, Result},
    service::CryptoService,
};

/// Minimum shape of a signed-URL payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAuth {
    #[serde(default, deserialize_with = "null_as_default")]
    pub token: String,
}

impl<C: Cipher> CryptoService<C> {
    /// Encrypt `value` for use in a signed URL. It must serialize to an
    /// object with a non-empty `token` field.
    pub fn encrypt_signed_url<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let json = serde_json::to_string(value).map_err(CryptoError::SerializationFailed)?;
        let auth: SignedAuth =
            serde_json::from_str(&json).map_err(|_| CryptoError::MissingToken)?;
        if auth.token.is_empty() {
            return Err(CryptoError::MissingToken);
        }
        self.encrypt(&json)
    }

    /// Decrypt a signed-URL payload, returning its token and the full JSON
    /// text.
    pub fn decrypt_signed_url(&self, enc: &str) -> Result<(String, String)> {
        let source = self.decrypt(enc)?;
        let auth: SignedAuth =
            serde_json::from_str(&source).map_err(CryptoError::DeserializationFailed)?;
        if auth.token.is_empty() {
            return Err(CryptoError::MissingToken);
        }
        Ok((auth.token, source))
    }
}
