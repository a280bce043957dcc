//! Credential encryption helpers for the cloud connector callback flow.
//!
//! The connector returns an encrypted credential payload in the redirect
//! callback. [`CryptoService`] normalizes the transport encoding of that
//! payload and decrypts it with the app's shared secret.

pub mod cipher;
pub mod credentials;
pub mod error;
pub mod escape;
pub mod service;
pub mod signed_url;

pub use {
    cipher::{Cipher, SecretCipher, TransportEncoding},
    credentials::{Credential, decode_credentials, detect_encoding},
    error::{CipherError, CryptoError},
    service::CryptoService,
    signed_url::SignedAuth,
};
