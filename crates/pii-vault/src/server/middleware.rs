//! Axum middleware settings applied to the router.

use std::time::Duration;

/// Default per-request timeout applied to all routes.
///
/// Covers one KMS round trip per PII field of the record.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
