//! The Vault: the only component that touches the persisted blob.
//!
//! `Vault` pairs a blob path with the process's Key Material.  `load`
//! decrypts and decodes the blob, `save` re-encrypts the whole Record
//! Store under a fresh nonce and replaces the file atomically, and
//! `destroy` deletes it.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::crypto::keys::KeyMaterial;
use crate::errors::{PwVaultError, Result};

use super::codec;
use super::format;
use super::lock::VaultLock;
use super::record::RecordStore;

/// Result of `Vault::destroy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    Removed,
    AlreadyAbsent,
}

/// Handle on the encrypted vault blob.
pub struct Vault {
    /// Path to the blob file on disk.
    path: PathBuf,

    /// Key Material held for the process lifetime (zeroized on drop).
    key: KeyMaterial,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("path", &self.path)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl Vault {
    pub fn new(path: impl Into<PathBuf>, key: KeyMaterial) -> Self {
        Self {
            path: path.into(),
            key,
        }
    }

    /// Returns the path to the blob file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if a blob has been written.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Take the cross-process advisory lock for a read-modify-write cycle.
    pub fn lock(&self) -> Result<VaultLock> {
        VaultLock::acquire(&self.path)
    }

    /// Read and decrypt the Record Store.
    ///
    /// A missing blob is a first run and yields an empty store.  Any
    /// failure to authenticate, decrypt or parse an existing blob is
    /// reported as `VaultCorrupted`; it never degrades to an empty store.
    pub fn load(&self) -> Result<RecordStore> {
        let blob = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no vault blob yet, starting empty");
                return Ok(RecordStore::empty());
            }
            Err(e) => return Err(e.into()),
        };

        let blob_key = self.key.blob_key()?;
        let plaintext =
            format::open(blob_key.as_slice(), &blob).map_err(|e| self.corrupted(e.to_string()))?;
        let store = codec::decode(&plaintext).map_err(|e| self.corrupted(e.to_string()))?;

        debug!(records = store.len(), "vault loaded");
        Ok(store)
    }

    /// Encrypt the full Record Store and atomically replace the blob.
    ///
    /// The ciphertext goes to a temp file in the same directory, is
    /// flushed to disk, then renamed over the target, so a crash leaves
    /// either the old blob or the new one.
    pub fn save(&self, store: &RecordStore) -> Result<()> {
        let plaintext = codec::encode(store)?;
        let blob_key = self.key.blob_key()?;
        let blob = format::seal(blob_key.as_slice(), &plaintext)?;

        write_atomic(&self.path, &blob)?;

        debug!(records = store.len(), bytes = blob.len(), "vault saved");
        Ok(())
    }

    /// Delete the blob.  Deleting an absent blob succeeds.
    pub fn destroy(&self) -> Result<DestroyOutcome> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "vault destroyed");
                Ok(DestroyOutcome::Removed)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(DestroyOutcome::AlreadyAbsent),
            Err(e) => Err(e.into()),
        }
    }

    fn corrupted(&self, reason: String) -> PwVaultError {
        PwVaultError::VaultCorrupted {
            path: self.path.clone(),
            reason,
        }
    }
}

/// Atomically replace `path` with `data`.
///
/// Writes a sibling temp file readable only by the owner, syncs it,
/// renames it over `path`, then syncs the parent directory so the rename
/// itself survives a power loss.  The parent directory is created if
/// missing.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let result = write_private(&tmp_path, data).and_then(|()| fs::rename(&tmp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result?;

    sync_dir(&parent)
}

/// Flush directory entries (renames, unlinks) in `dir` to disk.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

/// Write `data` to a fresh file readable only by the owner, and sync it.
fn write_private(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(data)?;
    file.sync_all()
}
