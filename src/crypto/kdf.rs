use anyhow::{Context, Result};
use argon2::{Algorithm, Argon2, Params, Version};

use super::KEY_LEN;

/// Work-factor parameters for Argon2id key derivation.
///
/// The defaults are the application-wide constants balancing interactive
/// unlock latency against brute-force resistance. A short numeric PIN has
/// little entropy on its own, so the work factor carries most of the cost
/// of an offline guess.
#[derive(Debug, Clone, Copy)]
pub struct KdfParams {
    mem_cost_kib: u32,
    time_cost: u32,
    parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            mem_cost_kib: 64 * 1024, // 64 MiB
            time_cost: 3,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    pub fn new(mem_cost_kib: u32, time_cost: u32, parallelism: u32) -> anyhow::Result<Self> {
        let params = Self {
            mem_cost_kib,
            time_cost,
            parallelism,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn mem_cost_kib(&self) -> u32 {
        self.mem_cost_kib
    }

    pub fn time_cost(&self) -> u32 {
        self.time_cost
    }

    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.mem_cost_kib < 8 {
            anyhow::bail!("argon2 memory cost too low");
        }
        if self.time_cost < 1 {
            anyhow::bail!("argon2 time cost must be >= 1");
        }
        if self.parallelism < 1 {
            anyhow::bail!("argon2 parallelism must be >= 1");
        }
        if self.mem_cost_kib < 8 * self.parallelism {
            anyhow::bail!("argon2 memory cost must be at least 8 * parallelism");
        }
        Ok(())
    }
}

/// Derives the 256-bit vault encryption key from a PIN and salt.
///
/// Deterministic: the key is never persisted, only re-derived on unlock,
/// so identical `(pin, salt)` must always produce identical output.
pub fn derive_key(pin: &str, salt: &[u8], kdf: KdfParams) -> Result<[u8; KEY_LEN]> {
    kdf.validate().context("invalid Argon2 parameters")?;

    let params = Params::new(
        kdf.mem_cost_kib,
        kdf.time_cost,
        kdf.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| anyhow::anyhow!("failed to construct Argon2 params: {e}"))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(pin.as_bytes(), salt, &mut key)
        .map_err(|e| anyhow::anyhow!("argon2 key derivation failed {e}"))?;

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kdf_is_deterministic() {
        let salt = [42u8; 16];
        let kdf = KdfParams::new(8192, 1, 1).unwrap();

        let k1 = derive_key("1234", &salt, kdf).unwrap();
        let k2 = derive_key("1234", &salt, kdf).unwrap();

        assert_eq!(k1, k2);
    }

    #[test]
    fn different_pins_give_different_keys() {
        let salt = [42u8; 16];
        let kdf = KdfParams::new(8192, 1, 1).unwrap();

        let k1 = derive_key("1234", &salt, kdf).unwrap();
        let k2 = derive_key("1235", &salt, kdf).unwrap();

        assert_ne!(k1, k2);
    }

    #[test]
    fn kdf_params_affect_output() {
        let salt = [7u8; 16];

        let kdf1 = KdfParams::new(8192, 1, 1).unwrap();
        let kdf2 = KdfParams::new(16384, 1, 1).unwrap();

        let k1 = derive_key("1234", &salt, kdf1).unwrap();
        let k2 = derive_key("1234", &salt, kdf2).unwrap();

        assert_ne!(k1, k2);
    }

    #[test]
    fn kdf_invalid_params_fail_gracefully() {
        assert!(KdfParams::new(0, 0, 0).is_err());
    }
}
