//! Backup envelopes and the restore reconciler.
//!
//! A backup carries the same opaque ciphertext string as the local vault
//! record, but no salt. Restoring on a fresh device therefore has to probe
//! the key-derivation schemes the app has historically used, in fixed order,
//! accepting the first key that opens the blob to a valid document.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cipher;
use crate::crypto::{self, KdfParams, SALT_LEN};
use crate::document::Document;

/// Envelope format version written by this crate.
pub const ENVELOPE_VERSION: &str = "1";

/// Shared salt of the oldest backup scheme.
///
/// Known weakness: identical across every installation, so it adds nothing
/// against precomputation. Kept only so backups produced under that scheme
/// stay restorable; new code paths must never derive keys from it.
pub const LEGACY_BACKUP_SALT: &[u8; SALT_LEN] = b"habitlock-backup";

/// Versioned wrapper around a ciphertext blob sent to or from external
/// storage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BackupEnvelope {
    version: String,
    timestamp: DateTime<Utc>,
    data: String,
}

impl BackupEnvelope {
    pub fn new(data: String) -> Self {
        Self {
            version: ENVELOPE_VERSION.to_string(),
            timestamp: Utc::now(),
            data,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("failed to serialize backup envelope")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("not a valid backup envelope")
    }
}

/// Key-derivation schemes a backup may have been produced under.
///
/// The envelope carries no marker distinguishing them — the scheme changed
/// at some point without a format bump — so restore probes the list in
/// order. A compatibility shim, not a design to extend; if a third scheme
/// ever exists it gets appended here and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrategy {
    /// Current scheme at backup time: key derived under [`LEGACY_BACKUP_SALT`].
    DefaultSalt,
    /// Older self-salted scheme: the PIN doubles as the salt.
    PinAsSalt,
}

impl KeyStrategy {
    /// Probe order for restore. First validated decrypt wins.
    pub const RESTORE_ORDER: [KeyStrategy; 2] = [KeyStrategy::DefaultSalt, KeyStrategy::PinAsSalt];

    /// The salt this scheme feeds into key derivation.
    ///
    /// The self-salted scheme cycles the PIN digits out to the full salt
    /// width, since the derivation function requires a minimum salt length a
    /// 4-digit PIN does not meet on its own.
    pub fn salt(&self, pin: &str) -> [u8; SALT_LEN] {
        match self {
            KeyStrategy::DefaultSalt => *LEGACY_BACKUP_SALT,
            KeyStrategy::PinAsSalt => {
                let bytes = pin.as_bytes();
                let mut salt = [0u8; SALT_LEN];
                if !bytes.is_empty() {
                    for (i, slot) in salt.iter_mut().enumerate() {
                        *slot = bytes[i % bytes.len()];
                    }
                }
                salt
            }
        }
    }
}

/// Outcome of a restore attempt.
///
/// A wrong PIN and a corrupted backup are indistinguishable from here — both
/// surface as `IncorrectPin`, and the design accepts that ambiguity instead
/// of guessing further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored,
    IncorrectPin,
}

/// Tries every historical key scheme against the blob, in order.
///
/// Pure: touches no persisted state. Returns the recovered document and the
/// scheme that opened it, or `None` when no scheme produced a valid
/// document.
pub fn recover(
    blob: &str,
    pin: &str,
    kdf: KdfParams,
) -> Result<Option<(Document, KeyStrategy)>> {
    for strategy in KeyStrategy::RESTORE_ORDER {
        let salt = strategy.salt(pin);
        let key = crypto::derive_key(pin, &salt, kdf)?;

        if let Some(document) = cipher::open(blob, &key) {
            return Ok(Some((document, strategy)));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Habit;

    fn fast_kdf() -> KdfParams {
        KdfParams::new(8192, 1, 1).unwrap()
    }

    fn sample_document() -> Document {
        let mut doc = Document::new();
        doc.add_habit(Habit::new("h1", "read"));
        doc
    }

    fn blob_under(strategy: KeyStrategy, pin: &str) -> String {
        let key = crypto::derive_key(pin, &strategy.salt(pin), fast_kdf()).unwrap();
        cipher::seal(&sample_document(), &key).unwrap()
    }

    #[test]
    fn recovers_default_salt_backup() {
        let blob = blob_under(KeyStrategy::DefaultSalt, "1234");

        let (doc, strategy) = recover(&blob, "1234", fast_kdf()).unwrap().unwrap();
        assert_eq!(strategy, KeyStrategy::DefaultSalt);
        assert_eq!(doc.habits()[0].id(), "h1");
    }

    #[test]
    fn recovers_legacy_self_salted_backup() {
        let blob = blob_under(KeyStrategy::PinAsSalt, "4711");

        let (doc, strategy) = recover(&blob, "4711", fast_kdf()).unwrap().unwrap();
        assert_eq!(strategy, KeyStrategy::PinAsSalt);
        assert_eq!(doc.habits()[0].id(), "h1");
    }

    #[test]
    fn wrong_pin_recovers_nothing() {
        for strategy in KeyStrategy::RESTORE_ORDER {
            let blob = blob_under(strategy, "1234");
            assert!(recover(&blob, "0000", fast_kdf()).unwrap().is_none());
        }
    }

    #[test]
    fn corrupted_blob_recovers_nothing() {
        assert!(recover("definitely not a blob", "1234", fast_kdf())
            .unwrap()
            .is_none());
    }

    #[test]
    fn self_salted_scheme_cycles_pin_to_salt_width() {
        let salt = KeyStrategy::PinAsSalt.salt("1234");
        assert_eq!(&salt, b"1234123412341234");
    }

    #[test]
    fn default_salt_ignores_pin() {
        assert_eq!(
            KeyStrategy::DefaultSalt.salt("1234"),
            KeyStrategy::DefaultSalt.salt("9999")
        );
    }

    #[test]
    fn envelope_json_roundtrip() {
        let envelope = BackupEnvelope::new("blob==".to_string());
        let json = envelope.to_json().unwrap();
        let parsed = BackupEnvelope::from_json(&json).unwrap();

        assert_eq!(parsed, envelope);
        assert_eq!(parsed.version(), ENVELOPE_VERSION);
    }

    #[test]
    fn envelope_rejects_malformed_json() {
        assert!(BackupEnvelope::from_json("{\"version\":\"1\"}").is_err());
        assert!(BackupEnvelope::from_json("nope").is_err());
    }
}
