//! Shared application state injected into every Axum handler.

use crate::crypto::CipherGateway;
use crate::pii::PiiFieldMapper;

/// Application state shared across all request handlers.
///
/// Cheap to clone: the mapper only holds `Arc`-backed handles.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Field mapper applied to every protect/reveal request.
    pub mapper: PiiFieldMapper,
}

impl AppState {
    /// Create a new [`AppState`] around `mapper`.
    pub fn new(mapper: PiiFieldMapper) -> Self {
        Self { mapper }
    }
}

impl Default for AppState {
    /// Creates a passthrough [`AppState`], suitable for tests.
    fn default() -> Self {
        Self::new(PiiFieldMapper::new(CipherGateway::passthrough()))
    }
}
