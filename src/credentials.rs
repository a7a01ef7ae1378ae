//! The credential record: per-installation salt, PIN hash, and PIN-length hint.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::crypto::{self, SALT_LEN};

/// Persisted PIN credentials, one record per installation.
///
/// `salt` and `pin_hash` are only ever written together; the store is
/// considered configured iff the whole record exists. The hash verifies the
/// PIN without revealing the encryption key, which is re-derived separately.
/// `pin_length` exists purely so an entry UI can size itself and carries no
/// security weight.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Credentials {
    salt: String,
    pin_hash: String,
    pin_length: u8,
}

impl Credentials {
    /// Creates a fresh record for a new PIN: random salt, salted hash.
    pub fn setup(pin: &str) -> Result<Self> {
        let salt = crypto::generate_salt()?;
        let pin_hash = crypto::hash_pin(pin, &salt);

        Ok(Self {
            salt: hex::encode(salt),
            pin_hash: hex::encode(pin_hash),
            pin_length: pin.len() as u8,
        })
    }

    /// Recomputes the salted hash and compares.
    ///
    /// Plain equality on purpose: this is a low-assurance gate against casual
    /// device access, not a hardened oracle. The real boundary is the slow
    /// key derivation plus the authenticated cipher.
    pub fn verify(&self, pin: &str) -> bool {
        match self.salt_bytes() {
            Ok(salt) => hex::encode(crypto::hash_pin(pin, &salt)) == self.pin_hash,
            Err(_) => false,
        }
    }

    pub fn salt_bytes(&self) -> Result<[u8; SALT_LEN]> {
        let raw = hex::decode(&self.salt).context("credential salt is not valid hex")?;
        raw.as_slice()
            .try_into()
            .context("credential salt has wrong length")
    }

    pub fn pin_length(&self) -> u8 {
        self.pin_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_correct_pin() {
        let creds = Credentials::setup("1234").unwrap();
        assert!(creds.verify("1234"));
    }

    #[test]
    fn verify_rejects_wrong_pin() {
        let creds = Credentials::setup("1234").unwrap();
        assert!(!creds.verify("0000"));
        assert!(!creds.verify("12345"));
        assert!(!creds.verify(""));
    }

    #[test]
    fn setup_generates_unique_salts() {
        let a = Credentials::setup("1234").unwrap();
        let b = Credentials::setup("1234").unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.pin_hash, b.pin_hash);
    }

    #[test]
    fn pin_length_is_recorded() {
        assert_eq!(Credentials::setup("1234").unwrap().pin_length(), 4);
        assert_eq!(Credentials::setup("123456").unwrap().pin_length(), 6);
    }

    #[test]
    fn salt_roundtrips_through_hex() {
        let creds = Credentials::setup("1234").unwrap();
        let salt = creds.salt_bytes().unwrap();
        assert_eq!(hex::encode(salt), creds.salt);
    }

    #[test]
    fn corrupted_salt_fails_verification() {
        let mut creds = Credentials::setup("1234").unwrap();
        creds.salt = "zz".to_string();
        assert!(!creds.verify("1234"));
        assert!(creds.salt_bytes().is_err());
    }
}
