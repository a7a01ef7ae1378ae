//! Cryptographic primitives for the vault.
//!
//! Provides slow PIN-based key derivation, authenticated encryption, and the
//! fast PIN verification hash.

pub mod aead;
pub mod kdf;
pub mod pin_hash;

pub use aead::{decrypt, encrypt, generate_salt};
pub use kdf::{KdfParams, derive_key};
pub use pin_hash::hash_pin;

/// Length of the salt (16 bytes).
pub const SALT_LEN: usize = 16;
/// Length of the nonce (24 bytes for XChaCha20-Poly1305).
pub const NONCE_LEN: usize = 24;
/// Length of the encryption key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// Length of the PIN verification hash (SHA-256 output).
pub const PIN_HASH_LEN: usize = 32;
