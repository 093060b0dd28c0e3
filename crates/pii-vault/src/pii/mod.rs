//! Field-level PII protection for storage records.
//!
//! The mapper is keyed on field names, not record types: any record that uses
//! one of [`PII_FIELDS`] gets that field encrypted on write and decrypted on
//! read.
//!
//! # Invariants
//!
//! - Fields outside [`PII_FIELDS`], absent (`None`) values, and empty strings
//!   pass through untouched in both directions.
//! - `protect` either encrypts every PII field or fails; it never returns a
//!   partially protected record.
//! - No field value is ever logged; only field names are.

pub mod mapper;

pub use mapper::{PiiFieldMapper, RevealOutcome};

/// Field names treated as PII in every record type.
pub const PII_FIELDS: [&str; 5] = ["email", "phone", "ssn", "address", "name"];

/// Returns `true` if `field` is one of [`PII_FIELDS`].
pub fn is_pii_field(field: &str) -> bool {
    PII_FIELDS.contains(&field)
}
