//! Clipboard collaborator.
//!
//! Copying is best-effort: callers report a failure and carry on.
//!
//! On Linux the selection is served by the process that set it, so the
//! contents vanish when pwvault exits unless a clipboard manager takes
//! them over.  `SystemClipboard::copy` therefore keeps serving the
//! selection for `HOLD_DURATION` (or until another application takes
//! ownership) before returning.  Other platforms hand the text to the OS and return at once.

use std::time::Duration;

use crate::errors::{PwVaultError, Result};

/// How long the Linux selection is served before pwvault lets go.
pub const HOLD_DURATION: Duration = Duration::from_secs(30);

/// Returns `true` if `SystemClipboard::copy` blocks while it serves
/// the selection.
pub const fn holds_until_released() -> bool {
    cfg!(target_os = "linux")
}

/// Handle on the system clipboard.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    /// Connect to the clipboard.  Fails on a headless session.
    pub fn open() -> Result<Self> {
        let inner = arboard::Clipboard::new()
            .map_err(|e| PwVaultError::CommandFailed(format!("clipboard unavailable: {e}")))?;
        Ok(Self { inner })
    }

    /// Place `secret` on the clipboard.
    pub fn copy(&mut self, secret: &str) -> Result<()> {
        write_text(&mut self.inner, secret)
            .map_err(|e| PwVaultError::CommandFailed(format!("clipboard write failed: {e}")))
    }
}

#[cfg(target_os = "linux")]
fn write_text(
    clipboard: &mut arboard::Clipboard,
    secret: &str,
) -> std::result::Result<(), arboard::Error> {
    use arboard::SetExtLinux;
    use std::time::Instant;

    clipboard
        .set()
        .wait_until(Instant::now() + HOLD_DURATION)
        .text(secret.to_owned())
}

#[cfg(not(target_os = "linux"))]
fn write_text(
    clipboard: &mut arboard::Clipboard,
    secret: &str,
) -> std::result::Result<(), arboard::Error> {
    clipboard.set_text(secret.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_linux_serves_the_selection_in_process() {
        assert_eq!(holds_until_released(), cfg!(target_os = "linux"));
        assert!(HOLD_DURATION.as_secs() > 0);
    }
}
