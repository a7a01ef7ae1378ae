use std::fmt;

/// Contract violations and state errors raised by the vault.
///
/// A wrong PIN is never one of these — verification failures are `Ok(false)`
/// values, because the UI's lockout policy needs to branch on them. These
/// variants mark conditions calling code must not conflate with a bad PIN,
/// most importantly `Locked`, which means a write was attempted before
/// unlocking.
#[derive(Debug, PartialEq, Eq)]
pub enum VaultError {
    /// No credential record exists yet; the vault has never been set up.
    NotConfigured,
    /// A credential record already exists; refusing to overwrite it.
    AlreadyConfigured,
    /// An operation requiring the session key ran while the vault was locked.
    Locked,
    /// The stored blob failed to decrypt under a verified PIN.
    Corrupted,
}

impl fmt::Display for VaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultError::NotConfigured => write!(f, "vault is not configured"),
            VaultError::AlreadyConfigured => write!(f, "vault is already configured"),
            VaultError::Locked => write!(f, "vault is locked; unlock before accessing data"),
            VaultError::Corrupted => write!(f, "stored data failed to decrypt under a verified PIN"),
        }
    }
}

impl std::error::Error for VaultError {}
