//! `--reset-master-password`: change the master password.
//!
//! Only the stored master password changes.  The secret key and the
//! vault blob are left as they are, so no re-encryption happens.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{load_context, prompt_new_master_password, Cli};
use crate::config::MASTER_PASSWORD;
use crate::credentials;
use crate::errors::Result;

/// Execute the rotate action.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut ctx = load_context(cli)?;

    output::info("Enter your current master password.");
    let auth = ctx.authorize(cli)?;

    let new_password = match &cli.password {
        Some(p) => Zeroizing::new(p.clone()),
        None => {
            output::info("Choose your new master password.");
            prompt_new_master_password()?
        }
    };

    let params = ctx.config.argon2_params();
    credentials::rotate_master_password(&auth, &mut ctx.config, &new_password, &params)?;

    output::success(&format!(
        "Master password changed in {}",
        ctx.config.file().path().display()
    ));
    if ctx.config.is_overridden(MASTER_PASSWORD) {
        output::warning(&format!(
            "{MASTER_PASSWORD} is set in the environment and still takes precedence."
        ));
        output::tip(&format!(
            "Unset {MASTER_PASSWORD} to use the new master password."
        ));
    }

    Ok(())
}
