use {
    serde::{Deserialize, Deserializer, Serialize},
    tracing::debug,
};

use crate::{
    cipher::{Cipher, TransportEncoding},
    error::{CryptoError, Result},
    escape::{query_escape, query_unescape},
};

/// Token set returned by the connector after the user authorizes the app.
///
/// Every field is optional on the wire, and `null` reads as empty; a payload
/// that only carries `error` still decodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credential {
    #[serde(deserialize_with = "null_as_default")]
    pub access_token: String,
    #[serde(deserialize_with = "null_as_default")]
    pub expires_in: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub refresh_token: String,
    #[serde(deserialize_with = "null_as_default")]
    pub provider: String,
    #[serde(deserialize_with = "null_as_default")]
    pub error: String,
    #[serde(deserialize_with = "null_as_default")]
    pub scope: String,
}

/// Read an explicit JSON `null` as the type's zero value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Credential {
    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }
}

/// Decide which transport encoding a raw callback value was sent with.
///
/// If escaping the unescaped value gives back `raw` unchanged, the value
/// was not URL-escaped and uses the cipher's default encoding. Anything
/// else is treated as escaped standard base64.
pub fn detect_encoding(raw: &str) -> Result<(String, TransportEncoding)> {
    let unescaped = query_unescape(raw)?;
    let encoding = if query_escape(&unescaped) == raw {
        TransportEncoding::Default
    } else {
        TransportEncoding::Standard
    };
    Ok((unescaped, encoding))
}

/// Decode the encrypted `result` parameter of a connector callback.
pub fn decode_credentials<C: Cipher + ?Sized>(cipher: &C, raw: &str) -> Result<Credential> {
    let (unescaped, encoding) = detect_encoding(raw)?;
    debug!(?encoding, len = raw.len(), "decoding callback credentials");

    let ciphertext = match encoding {
        // Unescaping turned any literal `+` into a space; standard base64
        // never contains a space.
        TransportEncoding::Standard => unescaped.replace(' ', "+"),
        _ => unescaped,
    };
    open_credential(cipher, &ciphertext, encoding)
}

pub(crate) fn open_credential<C: Cipher + ?Sized>(
    cipher: &C,
    ciphertext: &str,
    encoding: TransportEncoding,
) -> Result<Credential> {
    let plaintext = cipher
        .decrypt(ciphertext, encoding)
        .map_err(CryptoError::DecryptionFailed)?;
    serde_json::from_slice(&plaintext).map_err(CryptoError::DeserializationFailed)
}
