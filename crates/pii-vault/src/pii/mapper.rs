//! [`PiiFieldMapper`]: applies the cipher gateway and envelope codec to the
//! PII fields of a record.

use std::collections::BTreeSet;

use bytes::Bytes;
use common::PiiRecord;
use thiserror::Error;
use tracing::{debug, warn};

use super::is_pii_field;
use crate::crypto::{envelope, CipherError, CipherGateway, EnvelopeError};

/// Result of [`PiiFieldMapper::reveal_with_report`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealOutcome {
    /// The record with every revealable PII field in plaintext.
    pub record: PiiRecord,
    /// PII fields that were left exactly as stored.
    pub unrevealed: BTreeSet<String>,
}

/// Why a single field could not be revealed.
#[derive(Debug, Error)]
enum RevealFailure {
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
    #[error(transparent)]
    Cipher(#[from] CipherError),
}

/// Encrypts PII fields before a record is written and decrypts them after it is read.
#[derive(Debug, Clone)]
pub struct PiiFieldMapper {
    gateway: CipherGateway,
}

impl PiiFieldMapper {
    pub fn new(gateway: CipherGateway) -> Self {
        Self { gateway }
    }

    /// The gateway used for every field.
    pub fn gateway(&self) -> &CipherGateway {
        &self.gateway
    }

    /// Replace every non-empty PII field with its stored representation.
    ///
    /// # Errors
    ///
    /// Returns the first [`CipherError`] raised by the gateway. The input record
    /// is consumed and nothing partially protected is returned.
    pub async fn protect(&self, mut record: PiiRecord) -> Result<PiiRecord, CipherError> {
        let mut protected = 0usize;
        for (field, value) in record.iter_mut() {
            let Some(plaintext) = sensitive_value(field, value) else {
                continue;
            };
            let ciphertext = self.gateway.encrypt(plaintext).await?;
            *value = Some(self.encode_stored(&ciphertext));
            protected += 1;
        }
        debug!(protected, "record protected");
        Ok(record)
    }

    /// Replace every non-empty PII field with its plaintext.
    ///
    /// Fields that cannot be revealed are left as stored; see
    /// [`PiiFieldMapper::reveal_with_report`] to learn which ones.
    ///
    /// # Errors
    ///
    /// Returns a [`CipherError`] only when the key service itself fails.
    pub async fn reveal(&self, record: PiiRecord) -> Result<PiiRecord, CipherError> {
        Ok(self.reveal_with_report(record).await?.record)
    }

    /// Like [`PiiFieldMapper::reveal`], also reporting the fields left as stored.
    ///
    /// A field is left as stored when its text is not a valid envelope, when
    /// the key service does not recognise the ciphertext, or when the
    /// decrypted bytes are not UTF-8. Legacy plaintext rows and corrupted
    /// envelopes look the same here.
    ///
    /// # Errors
    ///
    /// Returns a [`CipherError`] when the key service fails for any other
    /// reason (access denied, network failure, ...).
    pub async fn reveal_with_report(
        &self,
        mut record: PiiRecord,
    ) -> Result<RevealOutcome, CipherError> {
        let mut unrevealed = BTreeSet::new();
        for (field, value) in record.iter_mut() {
            let Some(stored) = sensitive_value(field, value) else {
                continue;
            };
            let revealed = self.reveal_value(stored).await;
            match revealed {
                Ok(plaintext) => *value = Some(plaintext),
                Err(RevealFailure::Cipher(e)) if e.is_systemic() => return Err(e),
                Err(failure) => {
                    warn!(field = %field, error = %failure, "PII field left as stored");
                    unrevealed.insert(field.clone());
                }
            }
        }
        Ok(RevealOutcome { record, unrevealed })
    }

    async fn reveal_value(&self, stored: &str) -> Result<String, RevealFailure> {
        let ciphertext = self.decode_stored(stored)?;
        Ok(self.gateway.decrypt(ciphertext).await?)
    }

    /// Column text for `ciphertext`. Passthrough ciphertext is the plaintext
    /// itself and is stored verbatim.
    fn encode_stored(&self, ciphertext: &[u8]) -> String {
        if self.gateway.is_passthrough() {
            String::from_utf8_lossy(ciphertext).into_owned()
        } else {
            envelope::encode(ciphertext)
        }
    }

    fn decode_stored(&self, stored: &str) -> Result<Bytes, EnvelopeError> {
        if self.gateway.is_passthrough() {
            Ok(Bytes::copy_from_slice(stored.as_bytes()))
        } else {
            envelope::decode(stored)
        }
    }
}

/// The value of `field` if it is a PII field holding non-empty text.
fn sensitive_value<'a>(field: &str, value: &'a Option<String>) -> Option<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty() && is_pii_field(field))
}
