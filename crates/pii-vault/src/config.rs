//! Configuration loading and validation for the PII vault service.
//!
//! All values are read from environment variables at startup. Every key
//! setting is optional: a blank `AWS_KMS_KEY_ID` selects passthrough mode,
//! which the startup policy in [`crate::keys`] only accepts when
//! `ALLOW_UNENCRYPTED_PII=true`.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// KMS key ID or ARN used to encrypt PII fields.
    #[serde(default)]
    pub aws_kms_key_id: String,

    /// Static access key ID. Only used together with the secret key.
    #[serde(default)]
    pub aws_access_key_id: String,

    /// Static secret access key. Never logged.
    #[serde(default)]
    pub aws_secret_access_key: String,

    /// AWS region of the KMS key.
    #[serde(default = "default_region")]
    pub aws_region: String,

    /// Endpoint override for the KMS API (e.g. a LocalStack URL).
    #[serde(default)]
    pub aws_kms_endpoint_url: Option<String>,

    /// Accept running without a KMS key, storing PII as plaintext.
    #[serde(default)]
    pub allow_unencrypted_pii: bool,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// OTLP endpoint for span export. Spans are not exported when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_region() -> String {
    "us-east-1".into()
}
fn default_listen_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aws_kms_key_id: String::new(),
            aws_access_key_id: String::new(),
            aws_secret_access_key: String::new(),
            aws_region: default_region(),
            aws_kms_endpoint_url: None,
            allow_unencrypted_pii: false,
            listen_port: default_listen_port(),
            otel_exporter_otlp_endpoint: None,
            log_level: default_log_level(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("aws_kms_key_id", &self.aws_kms_key_id)
            .field("aws_access_key_id", &self.aws_access_key_id)
            .field("aws_secret_access_key", &"[REDACTED]")
            .field("aws_region", &self.aws_region)
            .field("aws_kms_endpoint_url", &self.aws_kms_endpoint_url)
            .field("allow_unencrypted_pii", &self.allow_unencrypted_pii)
            .field("listen_port", &self.listen_port)
            .field("otel_exporter_otlp_endpoint", &self.otel_exporter_otlp_endpoint)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Returns the OTLP endpoint, treating a blank value as unset.
    pub fn otlp_endpoint(&self) -> Option<&str> {
        non_blank(self.otel_exporter_otlp_endpoint.as_deref())
    }

    /// Returns the KMS endpoint override, treating a blank value as unset.
    pub fn kms_endpoint_url(&self) -> Option<&str> {
        non_blank(self.aws_kms_endpoint_url.as_deref())
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be > 0");
        }
        if !self.aws_kms_key_id.trim().is_empty() {
            ensure_non_empty(&self.aws_region, "AWS_REGION")?;
        }
        if let Some(url) = self.kms_endpoint_url() {
            ensure_http_url(url, "AWS_KMS_ENDPOINT_URL")?;
        }
        if let Some(url) = self.otlp_endpoint() {
            ensure_http_url(url, "OTEL_EXPORTER_OTLP_ENDPOINT")?;
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}

fn ensure_http_url(value: &str, name: &str) -> Result<()> {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        anyhow::bail!("{name} must be an http:// or https:// URL");
    }
    Ok(())
}
