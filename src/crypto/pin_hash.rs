use sha2::{Digest, Sha256};

use super::PIN_HASH_LEN;

/// Fast one-way hash used to verify a PIN against the credential record.
///
/// Distinct purpose from [`super::derive_key`]: this value is compared, never
/// used as key material, so it only needs preimage resistance rather than a
/// brute-force-slowing work factor. Salted to keep the hash per-installation.
pub fn hash_pin(pin: &str, salt: &[u8]) -> [u8; PIN_HASH_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(pin.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let salt = [9u8; 16];
        assert_eq!(hash_pin("1234", &salt), hash_pin("1234", &salt));
    }

    #[test]
    fn hash_differs_by_pin() {
        let salt = [9u8; 16];
        assert_ne!(hash_pin("1234", &salt), hash_pin("4321", &salt));
    }

    #[test]
    fn hash_differs_by_salt() {
        assert_ne!(hash_pin("1234", &[1u8; 16]), hash_pin("1234", &[2u8; 16]));
    }
}
