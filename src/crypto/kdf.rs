//! Master-password hashing using Argon2id.
//!
//! The master password is a comparison secret, not a key.  When pwvault
//! writes it to the config file (first-run setup, rotation) it stores an
//! Argon2id PHC string instead of the plaintext.  Parameters are
//! configurable via `Argon2Params` (loaded from the config file or
//! sensible defaults).

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use crate::errors::{PwVaultError, Result};

/// Length of the random salt in bytes.
const SALT_LEN: usize = 16;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Prefix shared by every Argon2 PHC string.
const PHC_PREFIX: &str = "$argon2";

/// Configurable Argon2id parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// Returns `true` if `value` looks like an Argon2 PHC hash string.
pub fn is_password_hash(value: &str) -> bool {
    value.starts_with(PHC_PREFIX)
}

/// Hash a master password into an Argon2id PHC string.
///
/// Enforces minimum Argon2 parameters to prevent dangerously weak settings.
pub fn hash_master_password(password: &[u8], argon2_params: &Argon2Params) -> Result<String> {
    if argon2_params.memory_kib < MIN_MEMORY_KIB {
        return Err(PwVaultError::KeyDerivationFailed(format!(
            "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
            argon2_params.memory_kib
        )));
    }
    if argon2_params.iterations < 1 {
        return Err(PwVaultError::KeyDerivationFailed(
            "Argon2 iterations must be at least 1".into(),
        ));
    }
    if argon2_params.parallelism < 1 {
        return Err(PwVaultError::KeyDerivationFailed(
            "Argon2 parallelism must be at least 1".into(),
        ));
    }

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        None,
    )
    .map_err(|e| PwVaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut salt_bytes = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| PwVaultError::KeyDerivationFailed(format!("salt encoding failed: {e}")))?;

    let hash = argon2
        .hash_password(password, &salt)
        .map_err(|e| PwVaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok(hash.to_string())
}

/// Check `password` against a stored PHC string.
///
/// The parameters and salt are read from the PHC string itself.  A
/// malformed hash is a configuration error, not a denial.
pub fn verify_master_password(password: &[u8], phc: &str) -> Result<bool> {
    let parsed = PasswordHash::new(phc).map_err(|e| {
        PwVaultError::ConfigError(format!("MASTER_PASSWORD is not a valid Argon2 hash: {e}"))
    })?;

    Ok(Argon2::default().verify_password(password, &parsed).is_ok())
}
