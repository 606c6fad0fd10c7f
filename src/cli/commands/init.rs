//! `--init`: first-run setup.
//!
//! Generates fresh Key Material, stores an Argon2id hash of the chosen
//! master password, and records the default vault path.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{load_config, prompt_new_master_password, Cli};
use crate::config::{self, ConfigSource, DEST, MASTER_PASSWORD, SECRET_KEY};
use crate::crypto::{kdf, KeyMaterial};
use crate::errors::{PwVaultError, Result};

/// Execute the `init` action.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut config = load_config(cli)?;
    let config_path = config.file().path().to_path_buf();

    // 1. Refuse to replace an existing key: it would orphan the vault.
    if config.file().get(SECRET_KEY).is_some() {
        output::tip("Use --reset-master-password to change the master password.");
        return Err(PwVaultError::CommandFailed(format!(
            "already initialised: {} has a {SECRET_KEY}",
            config_path.display()
        )));
    }

    // 2. Choose the master password.
    let password = match &cli.master_password {
        Some(p) => Zeroizing::new(p.clone()),
        None => prompt_new_master_password()?,
    };
    if password.is_empty() {
        return Err(PwVaultError::CommandFailed(
            "master password cannot be empty".into(),
        ));
    }

    // 3. Generate the key and hash the password.
    let key = KeyMaterial::generate();
    let phc = kdf::hash_master_password(password.as_bytes(), &config.argon2_params())?;

    // 4. Persist everything in one write.
    let encoded = key.to_encoded();
    let default_dest = match config.file().get(DEST) {
        Some(_) => None,
        None => config::default_vault_path().map(|d| d.to_string_lossy().into_owned()),
    };
    let mut values = vec![(SECRET_KEY, encoded.as_str()), (MASTER_PASSWORD, phc.as_str())];
    if let Some(dest) = &default_dest {
        values.push((DEST, dest.as_str()));
    }
    config.set_many(&values)?;

    output::success(&format!("Configuration written to {}", config_path.display()));
    output::warning(&format!(
        "Back up {SECRET_KEY}: without it the vault cannot be decrypted."
    ));
    for name in [MASTER_PASSWORD, SECRET_KEY, DEST] {
        if config.is_overridden(name) {
            output::warning(&format!(
                "{name} is set in the environment and overrides the new value."
            ));
        }
    }
    output::tip("Run `pwvault -s -a <ACCOUNT>` to save your first password.");

    Ok(())
}
