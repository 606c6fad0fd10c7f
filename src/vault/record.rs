//! Credential keys and the in-memory Record Store.
//!
//! A `CredentialKey` is the normalized `(account, username)` pair every
//! record is addressed by.  The `RecordStore` maps keys to plaintext
//! secrets and iterates in key order so listings are stable.

use std::collections::BTreeMap;
use std::fmt;

use zeroize::Zeroize;

use crate::errors::{PwVaultError, Result};

/// Username used when none (or an empty one) is supplied.
pub const DEFAULT_USERNAME: &str = "main";

/// Character joining account and username at the codec boundary.
///
/// It is rejected in user input so two distinct keys can never encode
/// to the same string.
pub const KEY_SEPARATOR: char = '|';

/// A normalized `(account, username)` pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CredentialKey {
    account: String,
    username: String,
}

impl CredentialKey {
    /// Build a key from raw user input.
    ///
    /// Both parts are lower-cased.  A missing or empty username becomes
    /// `"main"`.  The account must be non-empty, and neither part may
    /// contain the key separator or control characters.
    pub fn new(account: &str, username: Option<&str>) -> Result<Self> {
        let account = account.to_lowercase();
        let username = match username {
            Some(u) if !u.is_empty() => u.to_lowercase(),
            _ => DEFAULT_USERNAME.to_string(),
        };

        if account.is_empty() {
            return Err(PwVaultError::InvalidCredentialKey(
                "account cannot be empty".into(),
            ));
        }
        validate_component("account", &account)?;
        validate_component("username", &username)?;

        Ok(Self { account, username })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.account, self.username)
    }
}

fn validate_component(field: &str, value: &str) -> Result<()> {
    if value.contains(KEY_SEPARATOR) {
        return Err(PwVaultError::InvalidCredentialKey(format!(
            "{field} cannot contain '{KEY_SEPARATOR}'"
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(PwVaultError::InvalidCredentialKey(format!(
            "{field} cannot contain control characters"
        )));
    }
    Ok(())
}

/// In-memory mapping of credential keys to plaintext secrets.
///
/// Secrets are zeroized when the store is dropped.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    records: BTreeMap<CredentialKey, String>,
}

impl RecordStore {
    /// An empty store (first run).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CredentialKey) -> Option<&str> {
        self.records.get(key).map(String::as_str)
    }

    /// Insert or overwrite the secret for `key`.
    ///
    /// Returns `true` if an existing record was replaced.  The replaced
    /// secret is zeroized.
    pub fn set(&mut self, key: CredentialKey, secret: impl Into<String>) -> bool {
        match self.records.insert(key, secret.into()) {
            Some(mut old) => {
                old.zeroize();
                true
            }
            None => false,
        }
    }

    /// All records in key order.
    pub fn all(&self) -> impl Iterator<Item = (&CredentialKey, &str)> {
        self.records.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn contains(&self, key: &CredentialKey) -> bool {
        self.records.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Drop for RecordStore {
    fn drop(&mut self) {
        for secret in self.records.values_mut() {
            secret.zeroize();
        }
    }
}

impl fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.records.keys().map(|k| (k, "[REDACTED]")))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(account: &str, username: Option<&str>) -> CredentialKey {
        CredentialKey::new(account, username).unwrap()
    }

    #[test]
    fn key_is_lowercased() {
        let k = key("GitHub", Some("Alice"));
        assert_eq!(k.account(), "github");
        assert_eq!(k.username(), "alice");
    }

    #[test]
    fn missing_or_empty_username_defaults_to_main() {
        assert_eq!(key("acme", None).username(), "main");
        assert_eq!(key("acme", Some("")).username(), "main");
        assert_eq!(key("acme", Some("")), key("acme", Some("main")));
    }

    #[test]
    fn rejects_empty_account() {
        assert!(CredentialKey::new("", Some("bob")).is_err());
    }

    #[test]
    fn rejects_separator_in_either_part() {
        let err = CredentialKey::new("a|b", None).unwrap_err();
        assert!(matches!(err, PwVaultError::InvalidCredentialKey(_)));
        assert!(CredentialKey::new("acme", Some("x|y")).is_err());
    }

    #[test]
    fn rejects_control_characters() {
        assert!(CredentialKey::new("ac\nme", None).is_err());
        assert!(CredentialKey::new("acme", Some("bo\tb")).is_err());
    }

    #[test]
    fn hyphens_are_allowed() {
        let k = key("my-site", Some("first-last"));
        assert_eq!(k.account(), "my-site");
    }

    #[test]
    fn set_overwrites_existing_record() {
        let mut store = RecordStore::empty();
        assert!(!store.set(key("acme", None), "p1"));
        assert!(store.set(key("acme", Some("main")), "p2"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&key("acme", None)), Some("p2"));
    }

    #[test]
    fn get_missing_returns_none() {
        let store = RecordStore::empty();
        assert!(store.get(&key("nothing", None)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn all_iterates_in_key_order() {
        let mut store = RecordStore::empty();
        store.set(key("zeta", None), "z");
        store.set(key("alpha", Some("bob")), "b");
        store.set(key("alpha", Some("alice")), "a");

        let order: Vec<(String, String)> = store
            .all()
            .map(|(k, _)| (k.account().to_string(), k.username().to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("alpha".to_string(), "alice".to_string()),
                ("alpha".to_string(), "bob".to_string()),
                ("zeta".to_string(), "main".to_string()),
            ]
        );
    }

    #[test]
    fn debug_output_hides_secrets() {
        let mut store = RecordStore::empty();
        store.set(key("acme", None), "topsecret");
        let shown = format!("{store:?}");
        assert!(shown.contains("acme"));
        assert!(!shown.contains("topsecret"));
    }
}
