//! Typed contact records and their field-name keyed form.
//!
//! PII protection is keyed on field names, not record types. Each record type
//! here maps its own column names onto the shared names (`name`, `email`,
//! `phone`, ...) so that it is covered without any type-specific logic.

use serde::{Deserialize, Serialize};

use crate::protocol::PiiRecord;

/// Conversion between a typed record and a [`PiiRecord`].
pub trait PiiFields: Sized {
    /// Build the field-name keyed form. Absent values become explicit `None`.
    fn to_pii_record(&self) -> PiiRecord;

    /// Rebuild the typed record. Unknown keys are ignored.
    fn from_pii_record(record: PiiRecord) -> Self;
}

/// Owner contact details attached to a lead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadOwner {
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub owner_phone: Option<String>,
}

impl PiiFields for LeadOwner {
    fn to_pii_record(&self) -> PiiRecord {
        PiiRecord::from([
            ("name".to_string(), self.owner_name.clone()),
            ("email".to_string(), self.owner_email.clone()),
            ("phone".to_string(), self.owner_phone.clone()),
        ])
    }

    fn from_pii_record(mut record: PiiRecord) -> Self {
        Self {
            owner_name: take(&mut record, "name"),
            owner_email: take(&mut record, "email"),
            owner_phone: take(&mut record, "phone"),
        }
    }
}

/// Contact details of a cash buyer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl PiiFields for BuyerContact {
    fn to_pii_record(&self) -> PiiRecord {
        PiiRecord::from([
            ("name".to_string(), self.name.clone()),
            ("email".to_string(), self.email.clone()),
            ("phone".to_string(), self.phone.clone()),
        ])
    }

    fn from_pii_record(mut record: PiiRecord) -> Self {
        Self {
            name: take(&mut record, "name"),
            email: take(&mut record, "email"),
            phone: take(&mut record, "phone"),
        }
    }
}

fn take(record: &mut PiiRecord, field: &str) -> Option<String> {
    record.remove(field).flatten()
}
