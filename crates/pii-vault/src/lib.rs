//! PII protection for lead and buyer records.
//!
//! Sensitive fields are encrypted through a managed KMS key before a record is
//! written and decrypted after it is read. Without a configured key the
//! service runs in passthrough mode and stores plaintext, which must be
//! explicitly allowed at startup.
//!
//! ```text
//! record ─► PiiFieldMapper ─► CipherGateway ─► KeyService (KMS)
//!                 │
//!                 └─► envelope (base64) ─► text column
//! ```

pub mod config;
pub mod crypto;
pub mod keys;
pub mod kms;
pub mod pii;
pub mod server;
pub mod telemetry;

pub use crypto::{CipherError, CipherGateway, EnvelopeError};
pub use keys::KeyConfiguration;
pub use kms::{KeyService, KeyServiceError, KmsKeyService};
pub use pii::{PiiFieldMapper, RevealOutcome};
