//! Seam to the external backup blob store.
//!
//! The transport and its OAuth handshake live outside this crate; all the
//! vault needs is an opaque find/upload/download/delete surface. Helpers
//! await those calls strictly sequentially — only one derivation attempt is
//! meaningful at a time — and leave local state untouched on every failure
//! path.

use std::fmt;

use anyhow::Result;

use crate::Vault;
use crate::backup::{BackupEnvelope, RestoreOutcome};

/// Failures from the blob store.
///
/// `Unauthorized` must stay distinguishable from `NotFound`: the former
/// means the caller has to re-run the (out-of-scope) auth handshake, the
/// latter that no backup exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobError {
    Unauthorized,
    NotFound,
    Transport(String),
}

impl fmt::Display for BlobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobError::Unauthorized => write!(f, "blob store rejected credentials"),
            BlobError::NotFound => write!(f, "blob not found"),
            BlobError::Transport(msg) => write!(f, "blob store transport error: {msg}"),
        }
    }
}

impl std::error::Error for BlobError {}

/// Remote backup storage, one backup object per account.
#[allow(async_fn_in_trait)]
pub trait BlobStore {
    type Handle;

    /// Locates the existing backup object, if any.
    async fn find(&self) -> Result<Option<Self::Handle>, BlobError>;

    /// Uploads a new backup object.
    async fn upload(&self, content: &str) -> Result<(), BlobError>;

    /// Downloads the content of a backup object.
    async fn download(&self, handle: &Self::Handle) -> Result<String, BlobError>;

    /// Deletes a backup object.
    async fn delete(&self, handle: &Self::Handle) -> Result<(), BlobError>;
}

/// Outcome of a remote restore attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteRestoreOutcome {
    Restored,
    IncorrectPin,
    NoBackup,
}

/// Exports the vault under the backup scheme and uploads it, replacing any
/// existing backup. `Ok(false)` when the PIN does not verify; the local
/// record is read, never written.
pub async fn push_backup<S: BlobStore>(vault: &Vault, store: &S, pin: &str) -> Result<bool> {
    let Some(envelope) = vault.export_envelope(pin)? else {
        return Ok(false);
    };
    let content = envelope.to_json()?;

    if let Some(handle) = store.find().await? {
        store.delete(&handle).await?;
    }
    store.upload(&content).await?;

    Ok(true)
}

/// Downloads the remote backup and hands it to the restore reconciler.
///
/// Transport and authorization errors propagate as [`BlobError`] (reachable
/// via downcast); the expected negative outcomes are plain values.
pub async fn pull_and_restore<S: BlobStore>(
    vault: &mut Vault,
    store: &S,
    pin: &str,
) -> Result<RemoteRestoreOutcome> {
    let handle = match store.find().await? {
        Some(handle) => handle,
        None => return Ok(RemoteRestoreOutcome::NoBackup),
    };

    let content = store.download(&handle).await?;
    let envelope = BackupEnvelope::from_json(&content)?;

    match vault.restore_from_envelope(&envelope, pin)? {
        RestoreOutcome::Restored => Ok(RemoteRestoreOutcome::Restored),
        RestoreOutcome::IncorrectPin => Ok(RemoteRestoreOutcome::IncorrectPin),
    }
}
