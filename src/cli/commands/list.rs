//! `--get-all`: list every saved account with masked passwords.

use crate::cli::output;
use crate::cli::{load_context, Cli};
use crate::credentials;
use crate::errors::Result;

/// Execute the enumerate action.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = load_context(cli)?;
    let auth = ctx.authorize(cli)?;

    let entries = credentials::enumerate(&auth, &ctx.vault)?;
    if !entries.is_empty() {
        output::info(&format!("{} saved password(s)", entries.len()));
    }
    output::print_credentials_table(&entries);

    Ok(())
}
