//! Advisory lock serializing vault mutations across processes.
//!
//! The lock is held on a sibling file `<blob>.lock`: `flock(2)` on Unix,
//! `LockFileEx` on Windows.  On any other platform acquiring the lock
//! always succeeds without coordinating anything.
//!
//! The lock file is never deleted.  Unlinking it while another process
//! waits on its open handle would let a third process lock a fresh file
//! at the same path, leaving two holders.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{PwVaultError, Result};

/// Path of the lock file guarding `blob_path`.
pub fn lock_path(blob_path: &Path) -> PathBuf {
    let mut name = blob_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    blob_path.with_file_name(name)
}

/// Guard holding the exclusive lock until dropped.
#[derive(Debug)]
pub struct VaultLock {
    file: File,
    path: PathBuf,
}

impl VaultLock {
    /// Block until the exclusive lock for `blob_path` is held.
    pub fn acquire(blob_path: &Path) -> Result<Self> {
        let (file, path) = open_lock_file(blob_path)?;
        imp::lock_exclusive(&file).map_err(|e| lock_err(&path, &e))?;
        debug!(path = %path.display(), "vault lock acquired");
        Ok(Self { file, path })
    }

    /// Try to take the lock without blocking.
    ///
    /// Returns `Ok(None)` if another process holds it.
    pub fn try_acquire(blob_path: &Path) -> Result<Option<Self>> {
        let (file, path) = open_lock_file(blob_path)?;
        if imp::try_lock_exclusive(&file).map_err(|e| lock_err(&path, &e))? {
            debug!(path = %path.display(), "vault lock acquired");
            Ok(Some(Self { file, path }))
        } else {
            Ok(None)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for VaultLock {
    fn drop(&mut self) {
        let _ = imp::unlock(&self.file);
        debug!(path = %self.path.display(), "vault lock released");
    }
}

fn open_lock_file(blob_path: &Path) -> Result<(File, PathBuf)> {
    let path = lock_path(blob_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| lock_err(&path, &e))?;
        }
    }
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)
        .map_err(|e| lock_err(&path, &e))?;
    Ok((file, path))
}

fn lock_err(path: &Path, err: &std::io::Error) -> PwVaultError {
    PwVaultError::LockFailed(format!("{}: {err}", path.display()))
}

#[cfg(unix)]
mod imp {
    use std::fs::File;
    use std::io;
    use std::os::unix::io::AsRawFd;

    pub fn lock_exclusive(file: &File) -> io::Result<()> {
        // SAFETY: the descriptor is owned by `file` and stays open for the call.
        let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) };
        if result == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    pub fn try_lock_exclusive(file: &File) -> io::Result<bool> {
        // SAFETY: as above.
        let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if result == 0 {
            return Ok(true);
        }
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::WouldBlock {
            Ok(false)
        } else {
            Err(err)
        }
    }

    pub fn unlock(file: &File) -> io::Result<()> {
        // SAFETY: as above.
        let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_UN) };
        if result == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}

#[cfg(windows)]
mod imp {
    use std::fs::File;
    use std::io;
    use std::os::windows::io::AsRawHandle;

    type Handle = *mut std::ffi::c_void;

    #[repr(C)]
    #[allow(dead_code)]
    struct Overlapped {
        internal: usize,
        internal_high: usize,
        offset: u32,
        offset_high: u32,
        h_event: Handle,
    }

    const LOCKFILE_FAIL_IMMEDIATELY: u32 = 0x1;
    const LOCKFILE_EXCLUSIVE_LOCK: u32 = 0x2;
    const ERROR_LOCK_VIOLATION: i32 = 33;

    extern "system" {
        fn LockFileEx(
            h_file: Handle,
            flags: u32,
            reserved: u32,
            bytes_low: u32,
            bytes_high: u32,
            overlapped: *mut Overlapped,
        ) -> i32;

        fn UnlockFileEx(
            h_file: Handle,
            reserved: u32,
            bytes_low: u32,
            bytes_high: u32,
            overlapped: *mut Overlapped,
        ) -> i32;
    }

    fn overlapped() -> Overlapped {
        Overlapped {
            internal: 0,
            internal_high: 0,
            offset: 0,
            offset_high: 0,
            h_event: std::ptr::null_mut(),
        }
    }

    fn lock_file(file: &File, flags: u32) -> io::Result<()> {
        let mut ov = overlapped();
        // SAFETY: the handle is owned by `file` and `ov` outlives the call.
        let result = unsafe {
            LockFileEx(
                file.as_raw_handle() as Handle,
                LOCKFILE_EXCLUSIVE_LOCK | flags,
                0,
                1,
                0,
                &mut ov,
            )
        };
        if result != 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    pub fn lock_exclusive(file: &File) -> io::Result<()> {
        lock_file(file, 0)
    }

    pub fn try_lock_exclusive(file: &File) -> io::Result<bool> {
        match lock_file(file, LOCKFILE_FAIL_IMMEDIATELY) {
            Ok(()) => Ok(true),
            Err(err) if err.raw_os_error() == Some(ERROR_LOCK_VIOLATION) => Ok(false),
            Err(err) => Err(err),
        }
    }

    pub fn unlock(file: &File) -> io::Result<()> {
        let mut ov = overlapped();
        // SAFETY: as above.
        let result = unsafe { UnlockFileEx(file.as_raw_handle() as Handle, 0, 1, 0, &mut ov) };
        if result != 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}

#[cfg(not(any(unix, windows)))]
mod imp {
    use std::fs::File;
    use std::io;

    pub fn lock_exclusive(_file: &File) -> io::Result<()> {
        Ok(())
    }

    pub fn try_lock_exclusive(_file: &File) -> io::Result<bool> {
        Ok(true)
    }

    pub fn unlock(_file: &File) -> io::Result<()> {
        Ok(())
    }
}
