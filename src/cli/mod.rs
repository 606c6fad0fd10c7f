//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use zeroize::Zeroizing;

use crate::config::{
    self, ConfigSource, FileConfig, LayeredConfig, CONFIG_PATH_ENV, DEST, MASTER_PASSWORD,
    SECRET_KEY,
};
use crate::crypto::KeyMaterial;
use crate::errors::{PwVaultError, Result};
use crate::session::{Authorized, Session};
use crate::vault::{CredentialKey, Vault};

/// pwvault CLI: local encrypted password vault.
///
/// With no action flag the password for `--account`/`--username` is
/// copied to the clipboard.
#[derive(Parser)]
#[command(
    name = "pwvault",
    about = "Local encrypted password vault",
    disable_version_flag = true
)]
#[command(group(
    ArgGroup::new("action")
        .multiple(false)
        .args(["save", "get_all", "reset", "reset_master_password", "version", "init"])
))]
pub struct Cli {
    /// Account name (e.g. github)
    #[arg(short, long)]
    pub account: Option<String>,

    /// Username for the account (default: main)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Password to store (save), or the new master password (reset-master-password)
    #[arg(short, long)]
    pub password: Option<String>,

    /// Master password (prompted for if omitted)
    #[arg(short, long, alias = "master_password")]
    pub master_password: Option<String>,

    /// Save a new password or update an existing one
    #[arg(short, long)]
    pub save: bool,

    /// List all saved accounts with masked passwords
    #[arg(short, long, alias = "get_all")]
    pub get_all: bool,

    /// Delete all saved passwords
    #[arg(short, long)]
    pub reset: bool,

    /// Change the master password
    #[arg(long, alias = "reset_master_password")]
    pub reset_master_password: bool,

    /// Show version
    #[arg(short, long)]
    pub version: bool,

    /// First-run setup: generate a secret key and choose a master password
    #[arg(long)]
    pub init: bool,

    /// Print the retrieved password to stdout instead of the clipboard
    #[arg(long)]
    pub print: bool,

    /// Skip the confirmation prompt for --reset
    #[arg(long)]
    pub force: bool,

    /// Config file path (default: <config dir>/pwvault/config.toml)
    #[arg(long, env = CONFIG_PATH_ENV)]
    pub config: Option<PathBuf>,
}

/// The single action selected by the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Retrieve,
    Save,
    GetAll,
    Reset,
    ResetMasterPassword,
    Version,
    Init,
}

impl Cli {
    pub fn action(&self) -> Action {
        if self.version {
            Action::Version
        } else if self.init {
            Action::Init
        } else if self.save {
            Action::Save
        } else if self.get_all {
            Action::GetAll
        } else if self.reset {
            Action::Reset
        } else if self.reset_master_password {
            Action::ResetMasterPassword
        } else {
            Action::Retrieve
        }
    }
}

// ---------------------------------------------------------------------------
// Startup: configuration, key material, vault
// ---------------------------------------------------------------------------

/// Everything a gated command needs, built once at startup.
pub struct Context {
    pub config: LayeredConfig,
    pub vault: Vault,
    expected_master: Zeroizing<String>,
}

impl Context {
    /// Check the master password from `-m` or an interactive prompt.
    pub fn authorize(&self, cli: &Cli) -> Result<Authorized> {
        let supplied = master_password_input(cli)?;
        Session::authenticate(&supplied, &self.expected_master)
    }
}

/// Resolve the config file path from `--config`/`PWVAULT_CONFIG` or the
/// platform default.
pub fn config_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => config::default_config_path()
            .ok_or_else(|| PwVaultError::ConfigMissing(CONFIG_PATH_ENV.into())),
    }
}

/// Load the config file with the process environment layered on top.
pub fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let file = FileConfig::load(&config_path(cli)?)?;
    Ok(LayeredConfig::from_process_env(file))
}

/// Build the startup context.
///
/// Fails with `ConfigMissing` if the master password or secret key is not
/// configured, or if no vault path is configured and no default exists.
pub fn load_context(cli: &Cli) -> Result<Context> {
    let config = load_config(cli)?;

    let expected_master = config
        .get(MASTER_PASSWORD)
        .map(Zeroizing::new)
        .ok_or_else(|| PwVaultError::ConfigMissing(MASTER_PASSWORD.into()))?;

    let encoded_key = config
        .get(SECRET_KEY)
        .map(Zeroizing::new)
        .ok_or_else(|| PwVaultError::ConfigMissing(SECRET_KEY.into()))?;
    let key = KeyMaterial::from_encoded(&encoded_key)?;

    let dest = config
        .get(DEST)
        .map(PathBuf::from)
        .or_else(config::default_vault_path)
        .ok_or_else(|| PwVaultError::ConfigMissing(DEST.into()))?;

    Ok(Context {
        config,
        vault: Vault::new(dest, key),
        expected_master,
    })
}

// ---------------------------------------------------------------------------
// Shared input helpers
// ---------------------------------------------------------------------------

/// Master password from `-m`, or a hidden prompt.
pub fn master_password_input(cli: &Cli) -> Result<Zeroizing<String>> {
    if let Some(pw) = &cli.master_password {
        return Ok(Zeroizing::new(pw.clone()));
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Master Password")
        .allow_empty_password(true)
        .interact()
        .map_err(|e| PwVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_new_master_password() -> Result<Zeroizing<String>> {
    let password = dialoguer::Password::new()
        .with_prompt("New master password")
        .with_confirmation(
            "Confirm new master password",
            "Passwords do not match, try again",
        )
        .interact()
        .map_err(|e| PwVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(password))
}

/// Build the credential key from `-a`/`-u`, prompting for the account if
/// it was not given.
pub fn credential_key(cli: &Cli) -> Result<CredentialKey> {
    let account = match &cli.account {
        Some(a) => a.clone(),
        None => dialoguer::Input::<String>::new()
            .with_prompt("Account")
            .interact_text()
            .map_err(|e| PwVaultError::CommandFailed(format!("account prompt: {e}")))?,
    };
    CredentialKey::new(&account, cli.username.as_deref())
}
