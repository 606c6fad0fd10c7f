use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in pwvault.
#[derive(Debug, Error)]
pub enum PwVaultError {
    // --- Config errors ---
    #[error("Required configuration '{0}' is not set (environment or config file)")]
    ConfigMissing(String),

    #[error("Config file error: {0}")]
    ConfigError(String),

    #[error("Invalid secret key: {0}")]
    InvalidKeyMaterial(String),

    // --- Session errors ---
    #[error("Incorrect master password")]
    AuthDenied,

    // --- Record errors ---
    #[error("Password not found for account '{account}' (username '{username}')")]
    NotFound { account: String, username: String },

    #[error("Invalid credential key: {0}")]
    InvalidCredentialKey(String),

    #[error("Malformed record data: {0}")]
    FormatError(String),

    // --- Vault errors ---
    #[error("Vault at {path} is corrupted or was written with a different key: {reason}")]
    VaultCorrupted { path: PathBuf, reason: String },

    #[error("Could not lock vault: {0}")]
    LockFailed(String),

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for pwvault results.
pub type Result<T> = std::result::Result<T, PwVaultError>;
