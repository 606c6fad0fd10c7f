//! Credential operations: retrieve, enumerate, upsert, rotate, destroy.
//!
//! Every operation takes an `&Authorized` obtained from
//! `Session::authenticate`, so none of them can run after a denial.

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::config::{ConfigSource, MASTER_PASSWORD};
use crate::crypto::kdf::{self, Argon2Params};
use crate::errors::{PwVaultError, Result};
use crate::session::Authorized;
use crate::vault::{CredentialKey, DestroyOutcome, Vault};

/// Character used to mask each character of a secret in listings.
const MASK_CHAR: char = '*';

/// One row of an enumeration: the key and a mask, never the secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedEntry {
    pub account: String,
    pub username: String,
    pub mask: String,
}

/// Whether an upsert created or replaced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertKind {
    Added,
    Updated,
}

/// Result of a committed upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub kind: UpsertKind,
    /// Number of records in the vault after the save.
    pub total: usize,
}

/// Look up the secret stored under `key`.
pub fn retrieve(
    _auth: &Authorized,
    vault: &Vault,
    key: &CredentialKey,
) -> Result<Zeroizing<String>> {
    let store = vault.load()?;
    store
        .get(key)
        .map(|secret| Zeroizing::new(secret.to_string()))
        .ok_or_else(|| PwVaultError::NotFound {
            account: key.account().to_string(),
            username: key.username().to_string(),
        })
}

/// List every stored key with a length mask in place of the secret.
pub fn enumerate(_auth: &Authorized, vault: &Vault) -> Result<Vec<MaskedEntry>> {
    let store = vault.load()?;
    Ok(store
        .all()
        .map(|(key, secret)| MaskedEntry {
            account: key.account().to_string(),
            username: key.username().to_string(),
            mask: mask(secret),
        })
        .collect())
}

/// Insert or overwrite the secret for `key` and persist the vault.
///
/// The advisory lock is held from load through save.  If the save fails
/// the mutation is discarded with the in-memory store.
pub fn upsert(
    _auth: &Authorized,
    vault: &Vault,
    key: CredentialKey,
    secret: &str,
) -> Result<UpsertOutcome> {
    let _lock = vault.lock()?;

    let mut store = vault.load()?;
    let replaced = store.set(key, secret);
    vault.save(&store)?;

    let kind = if replaced {
        UpsertKind::Updated
    } else {
        UpsertKind::Added
    };
    debug!(?kind, total = store.len(), "credential saved");

    Ok(UpsertOutcome {
        kind,
        total: store.len(),
    })
}

/// Replace the configured master password.
///
/// Only the `MASTER_PASSWORD` value changes; the Key Material and the
/// vault blob are untouched.  The new password is stored as an Argon2id
/// hash.
pub fn rotate_master_password(
    _auth: &Authorized,
    config: &mut dyn ConfigSource,
    new_password: &str,
    params: &Argon2Params,
) -> Result<()> {
    if new_password.is_empty() {
        return Err(PwVaultError::CommandFailed(
            "new master password cannot be empty".into(),
        ));
    }

    let phc = kdf::hash_master_password(new_password.as_bytes(), params)?;
    config.set(MASTER_PASSWORD, &phc)?;

    info!("master password rotated");
    Ok(())
}

/// Delete the whole vault blob.  Succeeds if it is already gone.
///
/// An absent vault is reported without taking the lock, so nothing is
/// created on disk.  The lock file itself outlives the blob.
pub fn destroy(_auth: &Authorized, vault: &Vault) -> Result<DestroyOutcome> {
    if !vault.exists() {
        return Ok(DestroyOutcome::AlreadyAbsent);
    }
    let _lock = vault.lock()?;
    vault.destroy()
}

fn mask(secret: &str) -> String {
    std::iter::repeat(MASK_CHAR)
        .take(secret.chars().count())
        .collect()
}
