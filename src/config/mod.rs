//! Configuration collaborator.
//!
//! pwvault needs three named values: the expected master password, the
//! Key Material and the blob path.  They come from environment variables
//! layered over a TOML config file; the rest of the crate only sees the
//! `ConfigSource` trait.

pub mod settings;

use std::collections::HashMap;
use std::path::PathBuf;

pub use settings::{FileConfig, Settings};

use crate::crypto::kdf::Argon2Params;
use crate::errors::Result;

/// Expected master password (plaintext or Argon2 PHC hash).
pub const MASTER_PASSWORD: &str = "MASTER_PASSWORD";

/// Base64-encoded Key Material.
pub const SECRET_KEY: &str = "SECRET_KEY";

/// Older spelling of `SECRET_KEY`, still honoured in the environment.
pub const LEGACY_SECRET_KEY: &str = "MASTER_SECRET_KEY";

/// Path of the vault blob.
pub const DEST: &str = "DEST";

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "PWVAULT_CONFIG";

/// Names read from the process environment.
const ENV_NAMES: [&str; 4] = [MASTER_PASSWORD, SECRET_KEY, LEGACY_SECRET_KEY, DEST];

/// Read/write access to named configuration values.
pub trait ConfigSource {
    /// Look up a value.  Empty values read as absent.
    fn get(&self, name: &str) -> Option<String>;

    /// Persist a value.
    fn set(&mut self, name: &str, value: &str) -> Result<()>;
}

/// Environment variables layered over a config file.
///
/// Reads prefer the environment; writes always go to the file.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    file: FileConfig,
    env: HashMap<String, String>,
}

impl LayeredConfig {
    /// Build from an explicit environment snapshot.
    pub fn new(file: FileConfig, env: HashMap<String, String>) -> Self {
        let env = env.into_iter().filter(|(_, v)| !v.is_empty()).collect();
        Self { file, env }
    }

    /// Build from the current process environment.
    pub fn from_process_env(file: FileConfig) -> Self {
        let env = ENV_NAMES
            .iter()
            .filter_map(|name| {
                std::env::var(name)
                    .ok()
                    .map(|value| ((*name).to_string(), value))
            })
            .collect();
        Self::new(file, env)
    }

    /// Returns `true` if an environment variable masks the file value
    /// for `name`, so a `set` would not be visible on the next read.
    pub fn is_overridden(&self, name: &str) -> bool {
        self.env_value(name).is_some()
    }

    pub fn file(&self) -> &FileConfig {
        &self.file
    }

    /// Write several values to the file in one save.
    pub fn set_many(&mut self, values: &[(&str, &str)]) -> Result<()> {
        self.file.set_many(values)
    }

    pub fn argon2_params(&self) -> Argon2Params {
        self.file.settings().argon2_params()
    }

    fn env_value(&self, name: &str) -> Option<&String> {
        self.env.get(name).or_else(|| {
            if name == SECRET_KEY {
                self.env.get(LEGACY_SECRET_KEY)
            } else {
                None
            }
        })
    }
}

impl ConfigSource for LayeredConfig {
    fn get(&self, name: &str) -> Option<String> {
        self.env_value(name)
            .cloned()
            .or_else(|| self.file.get(name))
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        self.file.set(name, value)
    }
}

/// Default config file location: `<config_dir>/pwvault/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pwvault").join("config.toml"))
}

/// Default vault blob location: `<data_dir>/pwvault/passwords.vault`.
pub fn default_vault_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("pwvault").join("passwords.vault"))
}
