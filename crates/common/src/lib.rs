//! Common types, protocol definitions, and errors shared across `pii-vault` crates.

pub mod error;
pub mod protocol;
pub mod records;

pub use error::ServiceError;
pub use protocol::PiiRecord;
pub use records::{BuyerContact, LeadOwner, PiiFields};
