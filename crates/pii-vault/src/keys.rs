//! Key provider: decides once, at startup, whether a managed KMS key is available.
//!
//! [`resolve`] never fails and never touches the network; a missing key is a
//! valid outcome ([`KeyConfiguration::Unconfigured`]). Whether that outcome is
//! acceptable is a separate startup policy, see [`KeyConfiguration::enforce`].
//!
//! # Security invariants
//!
//! - Credentials are never logged; `Debug` output redacts the secret.
//! - The resolved configuration is immutable for the life of the process.

use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;

/// Static access key pair supplied through configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .finish()
    }
}

/// Everything needed to reach the managed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedKey {
    /// KMS key ID, ARN, or alias.
    pub key_id: String,
    /// Static credentials; `None` falls back to the default AWS credential chain.
    pub credentials: Option<StaticCredentials>,
    pub region: String,
    /// Endpoint override for the KMS API.
    pub endpoint_url: Option<String>,
}

/// Process-wide key state, resolved once from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyConfiguration {
    /// A managed key is configured; PII is encrypted through KMS.
    Configured(ManagedKey),
    /// No key is configured; PII is stored as plaintext.
    Unconfigured,
}

impl KeyConfiguration {
    /// Returns `true` if a managed key is configured.
    pub fn is_configured(&self) -> bool {
        matches!(self, KeyConfiguration::Configured(_))
    }

    /// Apply the startup policy for running without a managed key.
    ///
    /// # Errors
    ///
    /// Returns an error if no key is configured and `allow_unencrypted` is `false`.
    pub fn enforce(self, allow_unencrypted: bool) -> Result<Self> {
        match &self {
            KeyConfiguration::Configured(key) => {
                info!(
                    key_id = %key.key_id,
                    region = %key.region,
                    static_credentials = key.credentials.is_some(),
                    "managed KMS key configured"
                );
            }
            KeyConfiguration::Unconfigured if allow_unencrypted => {
                warn!("AWS_KMS_KEY_ID is not set; PII will be stored WITHOUT encryption");
            }
            KeyConfiguration::Unconfigured => {
                anyhow::bail!(
                    "AWS_KMS_KEY_ID is not set; set ALLOW_UNENCRYPTED_PII=true to run \
                     without encryption (development only)"
                );
            }
        }
        Ok(self)
    }
}

/// Resolve the key configuration from `cfg`.
///
/// A blank key ID yields [`KeyConfiguration::Unconfigured`]. Static credentials
/// are only used when both the access key ID and the secret are non-blank.
pub fn resolve(cfg: &Config) -> KeyConfiguration {
    let key_id = cfg.aws_kms_key_id.trim();
    if key_id.is_empty() {
        return KeyConfiguration::Unconfigured;
    }

    let access_key_id = cfg.aws_access_key_id.trim();
    let secret_access_key = cfg.aws_secret_access_key.trim();
    let credentials = (!access_key_id.is_empty() && !secret_access_key.is_empty()).then(|| {
        StaticCredentials {
            access_key_id: access_key_id.to_owned(),
            secret_access_key: secret_access_key.to_owned(),
        }
    });

    KeyConfiguration::Configured(ManagedKey {
        key_id: key_id.to_owned(),
        credentials,
        region: cfg.aws_region.trim().to_owned(),
        endpoint_url: cfg.kms_endpoint_url().map(str::to_owned),
    })
}
