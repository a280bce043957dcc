use {
    base64::{
        Engine, alphabet,
        engine::{
            DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig,
            general_purpose::{STANDARD, URL_SAFE_NO_PAD},
        },
    },
    chacha20poly1305::{ChaCha20Poly1305, Key, KeyInit, Nonce, aead::Aead},
    rand::RngCore,
    secrecy::{ExposeSecret, Secret},
    sha2::{Digest, Sha256},
};

use crate::error::{CipherError, CryptoError};

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// URL-safe alphabet, padded on output, padding optional on input.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Textual encoding applied to sealed bytes so they survive a URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportEncoding {
    /// The primitive's own convention: URL-safe alphabet, padded.
    #[default]
    Default,
    /// URL-safe alphabet without padding.
    RawUrlSafe,
    /// Standard `+/` alphabet with `=` padding.
    Standard,
}

impl TransportEncoding {
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Self::Default => URL_SAFE_LENIENT.encode(bytes),
            Self::RawUrlSafe => URL_SAFE_NO_PAD.encode(bytes),
            Self::Standard => STANDARD.encode(bytes),
        }
    }

    pub fn decode(self, text: &str) -> Result<Vec<u8>, base64::DecodeError> {
        match self {
            Self::Default => URL_SAFE_LENIENT.decode(text),
            Self::RawUrlSafe => URL_SAFE_NO_PAD.decode(text),
            Self::Standard => STANDARD.decode(text),
        }
    }
}

/// Symmetric encrypt/decrypt capability keyed by a shared secret.
pub trait Cipher: Send + Sync {
    fn encrypt(&self, plaintext: &[u8], encoding: TransportEncoding)
    -> Result<String, CipherError>;

    fn decrypt(&self, ciphertext: &str, encoding: TransportEncoding)
    -> Result<Vec<u8>, CipherError>;

    fn decrypt_string(
        &self,
        ciphertext: &str,
        encoding: TransportEncoding,
    ) -> Result<String, CipherError> {
        Ok(String::from_utf8(self.decrypt(ciphertext, encoding)?)?)
    }
}

/// ChaCha20-Poly1305 keyed by `SHA-256(secret)`.
///
/// Sealed layout is `nonce (12 bytes) || ciphertext || tag (16 bytes)`,
/// then the requested transport encoding.
#[derive(Clone)]
pub struct SecretCipher {
    aead: ChaCha20Poly1305,
}

impl SecretCipher {
    pub fn new(secret: &str) -> Result<Self, CryptoError> {
        if secret.is_empty() {
            return Err(CryptoError::InvalidSecret);
        }
        let digest = Sha256::digest(secret.as_bytes());
        Ok(Self {
            aead: ChaCha20Poly1305::new(Key::from_slice(&digest)),
        })
    }

    pub fn from_secret(secret: &Secret<String>) -> Result<Self, CryptoError> {
        Self::new(secret.expose_secret())
    }
}

impl std::fmt::Debug for SecretCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretCipher").finish_non_exhaustive()
    }
}

impl Cipher for SecretCipher {
    fn encrypt(
        &self,
        plaintext: &[u8],
        encoding: TransportEncoding,
    ) -> Result<String, CipherError> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce);

        let sealed = self
            .aead
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| CipherError::Seal)?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(encoding.encode(&out))
    }

    fn decrypt(
        &self,
        ciphertext: &str,
        encoding: TransportEncoding,
    ) -> Result<Vec<u8>, CipherError> {
        let bytes = encoding.decode(ciphertext)?;
        if bytes.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::Truncated { len: bytes.len() });
        }
        let (nonce, sealed) = bytes.split_at(NONCE_LEN);
        self.aead
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CipherError::Authentication)
    }
}
