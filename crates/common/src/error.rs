//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::KeyService`] → 502
/// - [`ServiceError::Internal`] → 500
///
/// Messages must never carry field values; they are returned verbatim to callers.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request body was not a valid record envelope.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The managed key service rejected or failed a cipher call.
    #[error("key service failure: {0}")]
    KeyService(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::KeyService(_) => 502,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in [`crate::protocol::ErrorResponse`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::KeyService(_) => "key_service_error",
            ServiceError::Internal(_) => "internal_error",
        }
    }
}
