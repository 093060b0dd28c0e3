//! Request and response types exchanged with the storage layer.
//!
//! These types are serialised as JSON over the sidecar's HTTP API.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A field-name keyed record as handed over by the storage layer.
///
/// `None` is explicit absence (a JSON `null`) and is preserved as such.
pub type PiiRecord = BTreeMap<String, Option<String>>;

// ---------------------------------------------------------------------------
// Protect endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/pii/protect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectRequest {
    /// Record whose PII fields should be encrypted before it is written.
    pub record: PiiRecord,
}

/// Successful response body for `POST /v1/pii/protect`.
///
/// PII fields hold their storage representation; everything else is echoed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectResponse {
    pub record: PiiRecord,
}

// ---------------------------------------------------------------------------
// Reveal endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/pii/reveal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealRequest {
    /// Record as read back from storage.
    pub record: PiiRecord,
}

/// Successful response body for `POST /v1/pii/reveal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealResponse {
    /// Record with every revealable PII field replaced by its plaintext.
    pub record: PiiRecord,
    /// PII fields that could not be revealed and were returned exactly as stored.
    #[serde(default)]
    pub unrevealed: BTreeSet<String>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status, always `"ok"` once the server is listening.
    pub status: String,
    /// `"managed"` when a KMS key is configured, `"passthrough"` otherwise.
    pub mode: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_fields_deserialise_as_absent() {
        let req: ProtectRequest = serde_json::from_value(json!({
            "record": {"email": "jane@example.com", "phone": null}
        }))
        .unwrap();
        assert_eq!(
            req.record.get("email"),
            Some(&Some("jane@example.com".to_string()))
        );
        assert_eq!(req.record.get("phone"), Some(&None));
        assert!(!req.record.contains_key("name"));
    }

    #[test]
    fn absent_fields_serialise_as_null() {
        let mut record = PiiRecord::new();
        record.insert("phone".into(), None);
        let json = serde_json::to_value(ProtectResponse { record }).unwrap();
        assert_eq!(json, json!({"record": {"phone": null}}));
    }

    #[test]
    fn reveal_response_defaults_unrevealed() {
        let resp: RevealResponse =
            serde_json::from_value(json!({"record": {"status": "new"}})).unwrap();
        assert!(resp.unrevealed.is_empty());
    }

    #[test]
    fn error_response_from_service_error() {
        let e = ErrorResponse::from(&crate::ServiceError::BadRequest("missing record".into()));
        assert_eq!(e.code, "bad_request");
        assert!(e.message.contains("missing record"));
    }
}
