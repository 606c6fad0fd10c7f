//! `--save`: add a password or replace an existing one.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{credential_key, load_context, Cli};
use crate::credentials::{self, UpsertKind};
use crate::errors::{PwVaultError, Result};

/// Execute the upsert action.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = load_context(cli)?;
    let auth = ctx.authorize(cli)?;
    let key = credential_key(cli)?;

    let secret = password_input(cli, &key.to_string())?;

    let outcome = credentials::upsert(&auth, &ctx.vault, key.clone(), &secret)?;

    match outcome.kind {
        UpsertKind::Added => output::success(&format!(
            "Password for {key} saved ({} total)",
            outcome.total
        )),
        UpsertKind::Updated => output::success(&format!(
            "Password for {key} updated ({} total)",
            outcome.total
        )),
    }

    Ok(())
}

/// Password to store, from `-p`, piped stdin, or a hidden prompt.
fn password_input(cli: &Cli, label: &str) -> Result<Zeroizing<String>> {
    if let Some(p) = &cli.password {
        output::warning("Password provided on the command line; it may appear in shell history.");
        return Ok(Zeroizing::new(p.clone()));
    }

    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim_end_matches(['\r', '\n']).len();
        buf.truncate(trimmed);
        return Ok(buf);
    }

    let pw = dialoguer::Password::new()
        .with_prompt(format!("Password for {label}"))
        .allow_empty_password(true)
        .interact()
        .map_err(|e| PwVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}
