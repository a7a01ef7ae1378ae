//! PIN-locked encrypted store for habit-tracker data.
//!
//! A short numeric PIN gates a single encrypted JSON document: the PIN is
//! verified against a salted hash, stretched into a 256-bit key by Argon2id,
//! and the key plus decrypted document live in an in-memory session until the
//! vault is locked. Backups wrap the same ciphertext format in a versioned
//! envelope; restoring one on a fresh device probes the historical
//! key-derivation schemes and re-keys the data onto a fresh local salt.

mod cipher;
mod credentials;
mod crypto;
mod document;
mod error;
mod record;
mod session;
mod storage;

pub mod backup;
pub mod remote;

pub use crate::backup::{BackupEnvelope, KeyStrategy, RestoreOutcome};
pub use crate::crypto::KdfParams;
pub use crate::document::{Document, Habit};
pub use crate::error::VaultError;
pub use crate::storage::Storage;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::credentials::Credentials;
use crate::record::VaultRecord;
use crate::session::Session;

/// The encrypted store: orchestrates credentials, ciphertext persistence,
/// and the session cache.
///
/// All persisted mutations are all-or-nothing: derived values are computed
/// and validated first, then the whole record (salt, hash, ciphertext) is
/// replaced in one atomic write. A failure partway through any operation
/// leaves the previous record byte-identical on disk.
///
/// Single-writer by construction — one unlocked session per process. Sharing
/// one vault file across concurrent processes would need an external lock
/// this crate does not provide.
pub struct Vault {
    storage: Storage,
    kdf: KdfParams,
    session: Session,
}

impl Vault {
    pub fn new(storage: Storage) -> Self {
        Self::with_kdf(storage, KdfParams::default())
    }

    pub fn with_kdf(storage: Storage, kdf: KdfParams) -> Self {
        Self {
            storage,
            kdf,
            session: Session::new(),
        }
    }

    /// True iff a credential record exists.
    pub fn is_configured(&self) -> bool {
        self.storage.exists()
    }

    pub fn is_unlocked(&self) -> bool {
        self.session.is_unlocked()
    }

    /// Creates the credential record and an encrypted empty document, then
    /// unlocks the session. Refuses to overwrite an existing record.
    pub fn setup_pin(&mut self, pin: &str) -> Result<()> {
        if self.is_configured() {
            return Err(VaultError::AlreadyConfigured.into());
        }

        let document = Document::new();
        self.rekey_and_persist(pin, document)
    }

    /// Checks the PIN against the stored hash. `Ok(false)` on mismatch, with
    /// nothing persisted touched — lockout counting is the caller's policy.
    ///
    /// On success the key is derived and the document decrypted and cached
    /// eagerly, so every subsequent read is cheap.
    pub fn verify_pin(&mut self, pin: &str) -> Result<bool> {
        let record = self.load_record()?;

        if !record.credentials().verify(pin) {
            return Ok(false);
        }

        let key = crypto::derive_key(pin, &record.credentials().salt_bytes()?, self.kdf)?;
        let document = cipher::open(record.data(), &key).ok_or(VaultError::Corrupted)?;

        self.session.unlock(key, document);
        Ok(true)
    }

    /// Re-keys the vault under a new PIN. `Ok(false)` if the old PIN does
    /// not verify, in which case the record on disk is untouched.
    pub fn change_pin(&mut self, old_pin: &str, new_pin: &str) -> Result<bool> {
        if !self.verify_pin(old_pin)? {
            return Ok(false);
        }

        let document = self
            .session
            .document()
            .cloned()
            .ok_or(VaultError::Locked)?;

        self.rekey_and_persist(new_pin, document)?;
        Ok(true)
    }

    /// The decrypted document, if the vault is unlocked.
    ///
    /// Normally served from the session cache. When only the key is cached
    /// the document is decrypted on demand — a degraded path kept for
    /// resilience, not a path callers should plan around.
    pub fn document(&mut self) -> Option<&Document> {
        if self.session.document().is_none() {
            let key = *self.session.key()?;
            let record = self.load_record().ok()?;
            let document = cipher::open(record.data(), &key)?;
            self.session.cache_document(document);
        }
        self.session.document()
    }

    /// Encrypts and persists the document, then updates the cache.
    ///
    /// Requires an unlocked session; calling this while locked is a
    /// programming error on the caller's side and is reported as the typed
    /// [`VaultError::Locked`], never conflated with a wrong PIN.
    pub fn save_document(&mut self, document: Document) -> Result<()> {
        let key = *self.session.key().ok_or(VaultError::Locked)?;
        let record = self.load_record()?;

        let blob = cipher::seal(&document, &key)?;
        let updated = VaultRecord::new(record.credentials().clone(), blob);
        self.storage.save(&updated.to_bytes()?)?;

        self.session.cache_document(document);
        Ok(())
    }

    /// Clears the session cache, zeroizing the derived key.
    pub fn lock(&mut self) {
        self.session.lock();
    }

    /// Erases the credential record, ciphertext, and session. Irreversible.
    pub fn clear_all(&mut self) -> Result<()> {
        self.session.lock();
        self.storage.remove()
    }

    /// Digit count of the configured PIN — an entry-UI sizing hint only.
    pub fn pin_length(&self) -> Option<u8> {
        self.load_record()
            .ok()
            .map(|record| record.credentials().pin_length())
    }

    /// Produces a backup envelope restorable without the local salt.
    ///
    /// The envelope carries no salt, so the document is re-encrypted under
    /// the default-salt backup scheme rather than wrapping the local blob
    /// verbatim. `Ok(None)` when the PIN does not verify.
    pub fn export_envelope(&self, pin: &str) -> Result<Option<BackupEnvelope>> {
        let record = self.load_record()?;

        if !record.credentials().verify(pin) {
            return Ok(None);
        }

        let local_key = crypto::derive_key(pin, &record.credentials().salt_bytes()?, self.kdf)?;
        let document = cipher::open(record.data(), &local_key).ok_or(VaultError::Corrupted)?;

        let backup_key =
            crypto::derive_key(pin, &KeyStrategy::DefaultSalt.salt(pin), self.kdf)?;
        let blob = cipher::seal(&document, &backup_key)?;

        Ok(Some(BackupEnvelope::new(blob)))
    }

    /// Runs the restore reconciler against a backup envelope.
    ///
    /// On acceptance the candidate PIN becomes the local PIN: fresh salt,
    /// new credential record, the recovered document re-encrypted under the
    /// canonical local scheme, all replaced in one write, session unlocked.
    /// On [`RestoreOutcome::IncorrectPin`] nothing persisted is touched.
    pub fn restore_from_envelope(
        &mut self,
        envelope: &BackupEnvelope,
        pin: &str,
    ) -> Result<RestoreOutcome> {
        match backup::recover(envelope.data(), pin, self.kdf)? {
            None => Ok(RestoreOutcome::IncorrectPin),
            Some((document, _strategy)) => {
                self.rekey_and_persist(pin, document)?;
                Ok(RestoreOutcome::Restored)
            }
        }
    }

    /// Derives everything for a new PIN, persists the whole record in one
    /// write, then unlocks the session with the new key.
    fn rekey_and_persist(&mut self, pin: &str, document: Document) -> Result<()> {
        let credentials = Credentials::setup(pin)?;
        let key = crypto::derive_key(pin, &credentials.salt_bytes()?, self.kdf)?;
        let blob = cipher::seal(&document, &key)?;
        let record = VaultRecord::new(credentials, blob);

        self.storage.save(&record.to_bytes()?)?;
        self.session.unlock(key, document);
        Ok(())
    }

    fn load_record(&self) -> Result<VaultRecord> {
        if !self.storage.exists() {
            return Err(VaultError::NotConfigured.into());
        }
        VaultRecord::from_bytes(&self.storage.load()?)
    }
}

/// Vault file location under the platform data directory.
pub fn default_storage() -> Result<Storage> {
    let project_dirs =
        ProjectDirs::from("", "", "habitlock").context("could not determine platform directories")?;

    let path = project_dirs.data_dir().join("vault.json");

    Ok(Storage::new(path))
}
