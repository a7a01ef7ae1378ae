//! Document sealing and opening.
//!
//! Converts between the [`Document`] and the opaque ciphertext string stored
//! locally and carried in backup envelopes: `base64(nonce || aead_ciphertext)`.
//! The string deliberately contains no salt — the salt lives in the credential
//! record, which is why restoring a backup on a fresh device has to guess
//! derivation strategies.

use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use zeroize::Zeroizing;

use crate::crypto::{self, KEY_LEN, NONCE_LEN};
use crate::document::Document;

/// Serializes and encrypts a document under the given key.
///
/// Fails only on serialization or RNG failure, never on key material.
pub fn seal(document: &Document, key: &[u8; KEY_LEN]) -> Result<String> {
    let plaintext =
        Zeroizing::new(serde_json::to_vec(document).context("failed to serialize document")?);
    let (ciphertext, nonce) = crypto::encrypt(key, &plaintext)?;

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);

    Ok(BASE64.encode(blob))
}

/// Decrypts and parses a ciphertext string, returning `None` on any failure.
///
/// A wrong key is an expected, common case here (interactive unlock, restore
/// strategy probing), so every failure mode — bad base64, truncated blob,
/// authentication failure, JSON that lacks the document shape — collapses to
/// `None` rather than an error. Callers depend on being able to try a key
/// and see.
pub fn open(blob: &str, key: &[u8; KEY_LEN]) -> Option<Document> {
    let raw = BASE64.decode(blob).ok()?;
    if raw.len() <= NONCE_LEN {
        return None;
    }

    let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
    let plaintext = crypto::decrypt(key, nonce, ciphertext).ok()?;

    serde_json::from_slice(&plaintext).ok()
}
