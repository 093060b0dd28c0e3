//! Managed key service: the external KMS that holds the key and performs
//! encrypt/decrypt on our behalf.
//!
//! [`KeyService`] is the seam between the cipher gateway and AWS. The
//! production implementation is [`KmsKeyService`]; tests substitute a
//! `mockall` mock.
//!
//! # Invariants
//!
//! - One remote call per invocation. No retries, no caching.
//! - Plaintext and ciphertext bytes never appear in errors or logs.

pub mod client;

pub use client::KmsKeyService;

use std::{future::Future, pin::Pin, sync::Arc};

use bytes::Bytes;
use thiserror::Error;

use crate::crypto::CipherGateway;
use crate::keys::KeyConfiguration;

/// Boxed future returned by [`KeyService`] calls.
pub type KeyServiceFuture<T> = Pin<Box<dyn Future<Output = Result<T, KeyServiceError>> + Send>>;

/// Errors produced by a managed key service call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyServiceError {
    /// The service refused the call (access denied, disabled key, unknown key, ...).
    #[error("{operation} rejected by key service: {code}: {message}")]
    Rejected {
        operation: &'static str,
        code: String,
        message: String,
    },

    /// Decrypt was handed bytes that are not a ciphertext blob of this service.
    #[error("ciphertext was not recognised by the key service")]
    InvalidCiphertext,

    /// The request could not be dispatched or the response could not be read.
    #[error("{operation} request failed: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    /// The service answered without the expected blob.
    #[error("key service response contained no {0}")]
    MissingField(&'static str),
}

impl KeyServiceError {
    /// Returns `true` if the failure concerns the input bytes rather than the service.
    pub fn is_invalid_ciphertext(&self) -> bool {
        matches!(self, KeyServiceError::InvalidCiphertext)
    }
}

/// Remote encrypt/decrypt operations of a managed key service.
#[cfg_attr(test, mockall::automock)]
pub trait KeyService: Send + Sync {
    /// Encrypt `plaintext` under `key_id`, returning the opaque ciphertext blob.
    fn encrypt(&self, key_id: &str, plaintext: Bytes) -> KeyServiceFuture<Bytes>;

    /// Decrypt a ciphertext blob previously returned by [`KeyService::encrypt`].
    fn decrypt(&self, ciphertext: Bytes) -> KeyServiceFuture<Bytes>;
}

/// Build the cipher gateway matching the resolved key configuration.
///
/// No network calls are made here; credentials are resolved lazily on the
/// first KMS request.
pub async fn build_gateway(keys: &KeyConfiguration) -> CipherGateway {
    match keys {
        KeyConfiguration::Configured(key) => {
            let service = KmsKeyService::connect(key).await;
            CipherGateway::managed(key.key_id.as_str(), Arc::new(service))
        }
        KeyConfiguration::Unconfigured => CipherGateway::passthrough(),
    }
}
