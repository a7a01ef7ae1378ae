//! In-memory session state for the unlocked vault.

use zeroize::Zeroize;

use crate::crypto::KEY_LEN;
use crate::document::Document;

/// Holds the derived key and the decrypted document while the vault is
/// unlocked. Never persisted; owned by the [`crate::Vault`] rather than
/// living in a global so its lifetime is explicit.
///
/// The cached document must stay consistent with the persisted ciphertext:
/// every mutation writes through to storage before the cache is updated.
#[derive(Default)]
pub struct Session {
    key: Option<[u8; KEY_LEN]>,
    document: Option<Document>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self) -> bool {
        self.key.is_some()
    }

    pub fn key(&self) -> Option<&[u8; KEY_LEN]> {
        self.key.as_ref()
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Installs a freshly derived key, dropping any previously cached state.
    pub fn unlock(&mut self, key: [u8; KEY_LEN], document: Document) {
        self.lock();
        self.key = Some(key);
        self.document = Some(document);
    }

    /// Replaces the cached document. Callers persist the ciphertext first.
    pub fn cache_document(&mut self, document: Document) {
        self.document = Some(document);
    }

    /// Clears the session, zeroizing the key material.
    pub fn lock(&mut self) {
        if let Some(mut key) = self.key.take() {
            key.zeroize();
        }
        self.document = None;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.lock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_locked() {
        let session = Session::new();
        assert!(!session.is_unlocked());
        assert!(session.key().is_none());
        assert!(session.document().is_none());
    }

    #[test]
    fn unlock_then_lock_clears_everything() {
        let mut session = Session::new();
        session.unlock([7u8; KEY_LEN], Document::new());
        assert!(session.is_unlocked());
        assert!(session.document().is_some());

        session.lock();
        assert!(!session.is_unlocked());
        assert!(session.document().is_none());
    }

    #[test]
    fn unlock_replaces_previous_state() {
        let mut session = Session::new();
        session.unlock([1u8; KEY_LEN], Document::new());
        session.unlock([2u8; KEY_LEN], Document::new());
        assert_eq!(session.key(), Some(&[2u8; KEY_LEN]));
    }
}
