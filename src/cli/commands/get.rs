//! Default action: copy one stored password to the clipboard.

use crate::cli::output;
use crate::cli::{credential_key, load_context, Cli};
use crate::clipboard::{self, SystemClipboard};
use crate::credentials;
use crate::errors::{PwVaultError, Result};

/// Execute the retrieve action.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = load_context(cli)?;
    let auth = ctx.authorize(cli)?;
    let key = credential_key(cli)?;

    let secret = credentials::retrieve(&auth, &ctx.vault, &key)?;

    if cli.print {
        println!("{}", secret.as_str());
        return Ok(());
    }

    let mut board = match SystemClipboard::open() {
        Ok(board) => board,
        Err(e) => {
            clipboard_fallback(&e);
            return Ok(());
        }
    };

    if clipboard::holds_until_released() {
        output::info(&format!(
            "Serving password for {key} on the clipboard for {}s; paste it now (Ctrl-C to stop).",
            clipboard::HOLD_DURATION.as_secs()
        ));
    }

    match board.copy(&secret) {
        Ok(()) if clipboard::holds_until_released() => output::info("Clipboard released."),
        Ok(()) => output::success(&format!("Password for {key} copied to clipboard")),
        Err(e) => clipboard_fallback(&e),
    }

    Ok(())
}

fn clipboard_fallback(err: &PwVaultError) {
    output::warning(&err.to_string());
    output::tip("Re-run with --print to write the password to stdout.");
}
