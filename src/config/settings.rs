use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ConfigSource, DEST, LEGACY_SECRET_KEY, MASTER_PASSWORD, SECRET_KEY};
use crate::crypto::kdf::Argon2Params;
use crate::errors::{PwVaultError, Result};
use crate::vault::store::write_atomic;

/// Contents of the pwvault config file (`config.toml`).
///
/// Every field is optional or has a sensible default so a missing file
/// behaves like an empty one.
#[derive(Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Expected master password: an Argon2 PHC hash, or plaintext.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_password: Option<String>,

    /// Base64-encoded 32-byte Key Material.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    /// Path of the vault blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_password: None,
            secret_key: None,
            dest: None,
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Settings")
            .field("master_password", &redact(&self.master_password))
            .field("secret_key", &redact(&self.secret_key))
            .field("dest", &self.dest)
            .field("argon2_memory_kib", &self.argon2_memory_kib)
            .field("argon2_iterations", &self.argon2_iterations)
            .field("argon2_parallelism", &self.argon2_parallelism)
            .finish()
    }
}

impl Settings {
    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            MASTER_PASSWORD => Some(&mut self.master_password),
            SECRET_KEY | LEGACY_SECRET_KEY => Some(&mut self.secret_key),
            DEST => Some(&mut self.dest),
            _ => None,
        }
    }

    fn field(&self, name: &str) -> Option<&Option<String>> {
        match name {
            MASTER_PASSWORD => Some(&self.master_password),
            SECRET_KEY | LEGACY_SECRET_KEY => Some(&self.secret_key),
            DEST => Some(&self.dest),
            _ => None,
        }
    }
}

/// A `Settings` value bound to the file it was loaded from.
#[derive(Debug, Clone)]
pub struct FileConfig {
    path: PathBuf,
    settings: Settings,
}

impl FileConfig {
    /// Load settings from `path`.
    ///
    /// If the file does not exist, defaults are returned (and nothing is
    /// written).  If it exists but cannot be parsed, an error is returned.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self {
                path: path.to_path_buf(),
                settings: Settings::default(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            PwVaultError::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            settings,
        })
    }

    /// Write the settings back to disk (owner-only, atomic).
    pub fn save(&self) -> Result<()> {
        let contents = toml::to_string_pretty(&self.settings)
            .map_err(|e| PwVaultError::ConfigError(format!("serialize config: {e}")))?;
        write_atomic(&self.path, contents.as_bytes())?;
        debug!(path = %self.path.display(), "config file written");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Update several values and persist them in a single write.
    ///
    /// Every name is checked before anything changes, so an unknown name
    /// leaves both memory and disk untouched.
    pub fn set_many(&mut self, values: &[(&str, &str)]) -> Result<()> {
        let mut updated = self.settings.clone();
        for (name, value) in values {
            let slot = updated
                .field_mut(name)
                .ok_or_else(|| PwVaultError::ConfigError(format!("unknown setting '{name}'")))?;
            *slot = Some((*value).to_string());
        }
        self.settings = updated;
        self.save()
    }
}

impl ConfigSource for FileConfig {
    fn get(&self, name: &str) -> Option<String> {
        self.settings
            .field(name)
            .cloned()
            .flatten()
            .filter(|v| !v.is_empty())
    }

    /// Update one value and persist the whole file.
    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        self.set_many(&[(name, value)])
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert!(s.master_password.is_none());
        assert!(s.secret_key.is_none());
        assert!(s.dest.is_none());
        assert_eq!(s.argon2_params(), Argon2Params::default());
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let config = FileConfig::load(&tmp.path().join("config.toml")).unwrap();
        assert!(!config.exists());
        assert!(config.get(MASTER_PASSWORD).is_none());
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        let contents = r#"
master_password = "hunter2"
secret_key = "c2VjcmV0"
dest = "/var/lib/pwvault/passwords.vault"
argon2_memory_kib = 131072
argon2_iterations = 5
argon2_parallelism = 8
"#;
        fs::write(&path, contents).unwrap();

        let config = FileConfig::load(&path).unwrap();
        assert_eq!(config.get(MASTER_PASSWORD).as_deref(), Some("hunter2"));
        assert_eq!(config.get(SECRET_KEY).as_deref(), Some("c2VjcmV0"));
        assert_eq!(config.get(LEGACY_SECRET_KEY).as_deref(), Some("c2VjcmV0"));
        assert_eq!(
            config.get(DEST).as_deref(),
            Some("/var/lib/pwvault/passwords.vault")
        );
        assert_eq!(config.settings().argon2_memory_kib, 131_072);
        assert_eq!(config.settings().argon2_iterations, 5);
        assert_eq!(config.settings().argon2_parallelism, 8);
    }

    #[test]
    fn empty_values_read_as_absent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "master_password = \"\"\n").unwrap();

        let config = FileConfig::load(&path).unwrap();
        assert!(config.get(MASTER_PASSWORD).is_none());
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "not valid {{toml").unwrap();

        assert!(FileConfig::load(&path).is_err());
    }

    #[test]
    fn set_persists_only_the_named_value() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");
        let mut config = FileConfig::load(&path).unwrap();
        config.set(SECRET_KEY, "a2V5").unwrap();
        config.set(MASTER_PASSWORD, "first").unwrap();
        config.set(MASTER_PASSWORD, "second").unwrap();

        let reloaded = FileConfig::load(&path).unwrap();
        assert_eq!(reloaded.get(MASTER_PASSWORD).as_deref(), Some("second"));
        assert_eq!(reloaded.get(SECRET_KEY).as_deref(), Some("a2V5"));
        assert!(reloaded.get(DEST).is_none());
    }

    #[test]
    fn set_rejects_unknown_name() {
        let tmp = TempDir::new().unwrap();
        let mut config = FileConfig::load(&tmp.path().join("config.toml")).unwrap();
        assert!(config.set("NOPE", "x").is_err());
        assert!(!config.exists());
    }

    #[test]
    fn set_many_writes_all_values_at_once() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        let mut config = FileConfig::load(&path).unwrap();
        config
            .set_many(&[(SECRET_KEY, "a2V5"), (MASTER_PASSWORD, "pw"), (DEST, "/v")])
            .unwrap();

        let reloaded = FileConfig::load(&path).unwrap();
        assert_eq!(reloaded.get(SECRET_KEY).as_deref(), Some("a2V5"));
        assert_eq!(reloaded.get(MASTER_PASSWORD).as_deref(), Some("pw"));
        assert_eq!(reloaded.get(DEST).as_deref(), Some("/v"));
    }

    #[test]
    fn set_many_with_unknown_name_changes_nothing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        let mut config = FileConfig::load(&path).unwrap();

        let result = config.set_many(&[(SECRET_KEY, "a2V5"), ("NOPE", "x")]);
        assert!(result.is_err());
        assert!(config.get(SECRET_KEY).is_none());
        assert!(!config.exists());
    }

    #[cfg(unix)]
    #[test]
    fn saved_config_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        let mut config = FileConfig::load(&path).unwrap();
        config.set(MASTER_PASSWORD, "pw").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let settings = Settings {
            master_password: Some("hunter2".into()),
            secret_key: Some("a2V5".into()),
            ..Settings::default()
        };
        let shown = format!("{settings:?}");
        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("a2V5"));
    }
}
