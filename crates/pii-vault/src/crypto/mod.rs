//! Value-level PII cryptography.
//!
//! - [`gateway`]: encrypt/decrypt one value through the managed key service,
//!   or pass it through unchanged when no key is configured.
//! - [`envelope`]: ciphertext bytes to and from the text stored in a column.
//!
//! # Stored format
//!
//! ```text
//! managed:     base64(KMS ciphertext blob)
//! passthrough: plaintext
//! ```
//!
//! Neither form carries a version marker, so stored text alone does not say
//! which of the two it is.

pub mod envelope;
pub mod gateway;

pub use envelope::EnvelopeError;
pub use gateway::{CipherError, CipherGateway};
