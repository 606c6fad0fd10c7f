//! `--reset`: delete the whole vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{load_context, Cli};
use crate::credentials;
use crate::errors::{PwVaultError, Result};
use crate::vault::DestroyOutcome;

/// Execute the destroy action.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = load_context(cli)?;
    let auth = ctx.authorize(cli)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !cli.force {
        let confirmed = Confirm::new()
            .with_prompt("Delete ALL saved passwords? This cannot be undone")
            .default(false)
            .interact()
            .map_err(|e| PwVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    match credentials::destroy(&auth, &ctx.vault)? {
        DestroyOutcome::Removed => output::success(&format!(
            "Vault deleted: {}",
            ctx.vault.path().display()
        )),
        DestroyOutcome::AlreadyAbsent => output::info("Vault is already empty."),
    }

    Ok(())
}
