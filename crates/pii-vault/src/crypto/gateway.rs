//! Cipher gateway: encrypt/decrypt of a single text value.
//!
//! A gateway is either *managed* (every call goes to the [`KeyService`] with
//! the configured key ID) or *passthrough* (no key configured; the value's
//! UTF-8 bytes are used as-is). The mode is fixed at construction.

use std::{string::FromUtf8Error, sync::Arc};

use bytes::Bytes;
use thiserror::Error;

use crate::kms::{KeyService, KeyServiceError};

/// Errors produced by the cipher gateway.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The managed key service call failed.
    #[error(transparent)]
    Service(#[from] KeyServiceError),

    /// Decrypted bytes are not valid UTF-8.
    #[error("decrypted value is not valid UTF-8")]
    Decode(#[from] FromUtf8Error),
}

impl CipherError {
    /// Returns `true` if the error points at the key service rather than one value.
    pub fn is_systemic(&self) -> bool {
        match self {
            CipherError::Service(e) => !e.is_invalid_ciphertext(),
            CipherError::Decode(_) => false,
        }
    }
}

#[derive(Clone)]
enum Mode {
    Passthrough,
    Managed {
        key_id: Arc<str>,
        service: Arc<dyn KeyService>,
    },
}

/// Encrypts and decrypts single values. Cheap to clone.
#[derive(Clone)]
pub struct CipherGateway {
    mode: Mode,
}

impl CipherGateway {
    /// A gateway that stores values without encryption.
    pub fn passthrough() -> Self {
        Self {
            mode: Mode::Passthrough,
        }
    }

    /// A gateway that encrypts every value under `key_id` through `service`.
    pub fn managed(key_id: impl Into<Arc<str>>, service: Arc<dyn KeyService>) -> Self {
        Self {
            mode: Mode::Managed {
                key_id: key_id.into(),
                service,
            },
        }
    }

    /// Returns `true` if no managed key is in use.
    pub fn is_passthrough(&self) -> bool {
        matches!(self.mode, Mode::Passthrough)
    }

    /// Encrypt `plaintext`, returning opaque ciphertext bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Service`] if the key service call fails.
    pub async fn encrypt(&self, plaintext: &str) -> Result<Bytes, CipherError> {
        match &self.mode {
            Mode::Passthrough => Ok(Bytes::copy_from_slice(plaintext.as_bytes())),
            Mode::Managed { key_id, service } => {
                let plaintext = Bytes::copy_from_slice(plaintext.as_bytes());
                Ok(service.encrypt(key_id, plaintext).await?)
            }
        }
    }

    /// Decrypt ciphertext bytes back to text.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Service`] if the key service call fails and
    /// [`CipherError::Decode`] if the plaintext is not valid UTF-8.
    pub async fn decrypt(&self, ciphertext: Bytes) -> Result<String, CipherError> {
        let plaintext = match &self.mode {
            Mode::Passthrough => ciphertext,
            Mode::Managed { service, .. } => service.decrypt(ciphertext).await?,
        };
        Ok(String::from_utf8(plaintext.to_vec())?)
    }
}

impl std::fmt::Debug for CipherGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.mode {
            Mode::Passthrough => f.write_str("CipherGateway::Passthrough"),
            Mode::Managed { key_id, .. } => f
                .debug_struct("CipherGateway::Managed")
                .field("key_id", key_id)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kms::{KeyServiceFuture, MockKeyService};

    fn ready<T: Send + 'static>(result: Result<T, KeyServiceError>) -> KeyServiceFuture<T> {
        Box::pin(std::future::ready(result))
    }

    fn access_denied() -> KeyServiceError {
        KeyServiceError::Rejected {
            operation: "Encrypt",
            code: "AccessDeniedException".into(),
            message: "not authorized".into(),
        }
    }

    #[tokio::test]
    async fn passthrough_is_identity() {
        let gateway = CipherGateway::passthrough();
        let ct = gateway.encrypt("jane@example.com").await.unwrap();
        assert_eq!(ct.as_ref(), b"jane@example.com");
        assert_eq!(gateway.decrypt(ct).await.unwrap(), "jane@example.com");
    }

    #[tokio::test]
    async fn passthrough_rejects_non_utf8() {
        let gateway = CipherGateway::passthrough();
        let err = gateway
            .decrypt(Bytes::from_static(&[0xFF, 0xFE]))
            .await
            .unwrap_err();
        assert!(matches!(err, CipherError::Decode(_)));
    }

    #[tokio::test]
    async fn managed_encrypt_uses_configured_key() {
        let mut kms = MockKeyService::new();
        kms.expect_encrypt().times(1).returning(|key_id, plaintext| {
            assert_eq!(key_id, "alias/pii");
            assert_eq!(plaintext.as_ref(), b"555-0100");
            ready(Ok(Bytes::from_static(&[0x01, 0x02, 0x03])))
        });
        let gateway = CipherGateway::managed("alias/pii", Arc::new(kms));
        let ct = gateway.encrypt("555-0100").await.unwrap();
        assert_eq!(ct.as_ref(), &[0x01, 0x02, 0x03]);
    }

    #[tokio::test]
    async fn managed_decrypt_returns_text() {
        let mut kms = MockKeyService::new();
        kms.expect_decrypt()
            .times(1)
            .returning(|_| ready(Ok(Bytes::from_static(b"Jane Doe"))));
        let gateway = CipherGateway::managed("alias/pii", Arc::new(kms));
        let pt = gateway
            .decrypt(Bytes::from_static(&[0x09]))
            .await
            .unwrap();
        assert_eq!(pt, "Jane Doe");
    }

    #[tokio::test]
    async fn managed_encrypt_failure_is_service_error() {
        let mut kms = MockKeyService::new();
        kms.expect_encrypt()
            .returning(|_, _| ready(Err(access_denied())));
        let gateway = CipherGateway::managed("alias/pii", Arc::new(kms));
        let err = gateway.encrypt("x@y.com").await.unwrap_err();
        assert!(matches!(err, CipherError::Service(_)));
        assert!(err.is_systemic());
    }

    #[tokio::test]
    async fn managed_decrypt_non_utf8_is_decode_error() {
        let mut kms = MockKeyService::new();
        kms.expect_decrypt()
            .returning(|_| ready(Ok(Bytes::from_static(&[0xC3, 0x28]))));
        let gateway = CipherGateway::managed("alias/pii", Arc::new(kms));
        let err = gateway.decrypt(Bytes::from_static(&[0x01])).await.unwrap_err();
        assert!(matches!(err, CipherError::Decode(_)));
        assert!(!err.is_systemic());
    }

    #[test]
    fn invalid_ciphertext_is_not_systemic() {
        assert!(!CipherError::Service(KeyServiceError::InvalidCiphertext).is_systemic());
    }

    #[test]
    fn debug_names_mode() {
        let kms = MockKeyService::new();
        let gateway = CipherGateway::managed("alias/pii", Arc::new(kms));
        assert!(format!("{gateway:?}").contains("alias/pii"));
        assert!(format!("{:?}", CipherGateway::passthrough()).contains("Passthrough"));
    }
}
