//! Persisted vault record.
//!
//! One JSON body per installation, written through [`crate::storage::Storage`]
//! in a single atomic replace. Bundling credentials and ciphertext into one
//! write is what keeps the salt / hash / ciphertext triple from ever being
//! observed half-updated after a crash or a failed operation.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::credentials::Credentials;

/// Current record format version.
pub const RECORD_VERSION: u8 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VaultRecord {
    version: u8,
    credentials: Credentials,
    data: String,
}

impl VaultRecord {
    pub fn new(credentials: Credentials, data: String) -> Self {
        Self {
            version: RECORD_VERSION,
            credentials,
            data,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The opaque ciphertext string, same format as a backup envelope's `data`.
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).context("failed to serialize vault record")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let record: Self =
            serde_json::from_slice(bytes).context("vault file is not a valid record")?;
        if record.version != RECORD_VERSION {
            bail!("unsupported vault record version: {}", record.version);
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> VaultRecord {
        let creds = Credentials::setup("1234").unwrap();
        VaultRecord::new(creds, "b64blob==".to_string())
    }

    #[test]
    fn record_roundtrip() {
        let record = sample_record();
        let bytes = record.to_bytes().unwrap();
        let parsed = VaultRecord::from_bytes(&bytes).unwrap();

        assert_eq!(parsed, record);
    }

    #[test]
    fn unsupported_version_fails() {
        let mut value: serde_json::Value =
            serde_json::from_slice(&sample_record().to_bytes().unwrap()).unwrap();
        value["version"] = serde_json::json!(99);
        let bytes = serde_json::to_vec(&value).unwrap();

        assert!(VaultRecord::from_bytes(&bytes).is_err());
    }

    #[test]
    fn truncated_record_fails() {
        let bytes = sample_record().to_bytes().unwrap();
        assert!(VaultRecord::from_bytes(&bytes[..bytes.len() / 2]).is_err());
    }

    #[test]
    fn missing_credentials_fails() {
        let bytes = br#"{"version":1,"data":"abc"}"#;
        assert!(VaultRecord::from_bytes(bytes).is_err());
    }
}
