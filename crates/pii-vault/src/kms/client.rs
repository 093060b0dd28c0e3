//! [`KmsKeyService`]: [`KeyService`] backed by the AWS KMS API.

use aws_config::{retry::RetryConfig, BehaviorVersion};
use aws_sdk_kms::{
    config::{Credentials, Region},
    error::{ProvideErrorMetadata, SdkError},
    operation::decrypt::DecryptError,
    primitives::Blob,
};
use aws_smithy_types::error::display::DisplayErrorContext;
use bytes::Bytes;

use super::{KeyService, KeyServiceError, KeyServiceFuture};
use crate::keys::ManagedKey;

/// Provider name reported by credentials taken from configuration.
const STATIC_CREDENTIALS_PROVIDER: &str = "pii-vault-config";

/// KMS client wrapper. Cheap to clone.
#[derive(Clone, Debug)]
pub struct KmsKeyService {
    client: aws_sdk_kms::Client,
}

impl KmsKeyService {
    /// Build a KMS client for `key`.
    ///
    /// Uses the static credentials from configuration when present, otherwise
    /// the standard AWS credential chain (environment, profile, IMDS).
    /// SDK retries are disabled: every call is a single request.
    pub async fn connect(key: &ManagedKey) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(key.region.clone()))
            .retry_config(RetryConfig::disabled());

        if let Some(creds) = &key.credentials {
            loader = loader.credentials_provider(Credentials::new(
                creds.access_key_id.clone(),
                creds.secret_access_key.clone(),
                None,
                None,
                STATIC_CREDENTIALS_PROVIDER,
            ));
        }
        if let Some(url) = &key.endpoint_url {
            loader = loader.endpoint_url(url.clone());
        }

        let config = loader.load().await;
        Self::from_client(aws_sdk_kms::Client::new(&config))
    }

    /// Wrap an already configured client.
    pub fn from_client(client: aws_sdk_kms::Client) -> Self {
        Self { client }
    }
}

impl KeyService for KmsKeyService {
    fn encrypt(&self, key_id: &str, plaintext: Bytes) -> KeyServiceFuture<Bytes> {
        let client = self.client.clone();
        let key_id = key_id.to_owned();
        Box::pin(async move {
            let out = client
                .encrypt()
                .key_id(key_id)
                .plaintext(Blob::new(plaintext.to_vec()))
                .send()
                .await
                .map_err(|e| sdk_error("Encrypt", e))?;

            out.ciphertext_blob()
                .map(|blob| Bytes::copy_from_slice(blob.as_ref()))
                .ok_or(KeyServiceError::MissingField("CiphertextBlob"))
        })
    }

    fn decrypt(&self, ciphertext: Bytes) -> KeyServiceFuture<Bytes> {
        let client = self.client.clone();
        Box::pin(async move {
            let out = client
                .decrypt()
                .ciphertext_blob(Blob::new(ciphertext.to_vec()))
                .send()
                .await
                .map_err(|e| {
                    if e
                        .as_service_error()
                        .is_some_and(DecryptError::is_invalid_ciphertext_exception)
                    {
                        KeyServiceError::InvalidCiphertext
                    } else {
                        sdk_error("Decrypt", e)
                    }
                })?;

            out.plaintext()
                .map(|blob| Bytes::copy_from_slice(blob.as_ref()))
                .ok_or(KeyServiceError::MissingField("Plaintext"))
        })
    }
}

/// Translate an SDK error into a [`KeyServiceError`].
fn sdk_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> KeyServiceError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    match err {
        SdkError::ServiceError(ctx) => {
            let service_err = ctx.into_err();
            KeyServiceError::Rejected {
                operation,
                code: service_err.code().unwrap_or("Unknown").to_owned(),
                message: service_err.message().unwrap_or_default().to_owned(),
            }
        }
        other => KeyServiceError::Transport {
            operation,
            message: DisplayErrorContext(&other).to_string(),
        },
    }
}
