//! Plaintext serialization of the Record Store.
//!
//! The encoded form is a JSON object mapping `"<account>|<username>"` to
//! the secret, with keys in sorted order:
//!
//! ```text
//! {"github|alice":"S3cr3t","github|bob":"hunter2"}
//! ```
//!
//! The composite string only exists at this boundary; everywhere else
//! keys are `CredentialKey` values.

use std::collections::BTreeMap;

use zeroize::Zeroizing;

use super::record::{CredentialKey, RecordStore, KEY_SEPARATOR};
use crate::errors::{PwVaultError, Result};

/// Serialize a Record Store to bytes.
pub fn encode(store: &RecordStore) -> Result<Zeroizing<Vec<u8>>> {
    let map: BTreeMap<String, &str> = store
        .all()
        .map(|(key, secret)| (join_key(key), secret))
        .collect();

    serde_json::to_vec(&map)
        .map(Zeroizing::new)
        .map_err(|e| PwVaultError::FormatError(format!("encode: {e}")))
}

/// Parse bytes produced by `encode` back into a Record Store.
///
/// Fails with `FormatError` if the document is not a JSON object of
/// strings, or if any key is not a valid normalized composite key.
pub fn decode(bytes: &[u8]) -> Result<RecordStore> {
    let map: BTreeMap<String, String> = serde_json::from_slice(bytes)
        .map_err(|e| PwVaultError::FormatError(format!("decode: {e}")))?;

    let mut store = RecordStore::empty();
    for (composite, secret) in map {
        let key = split_key(&composite)?;
        store.set(key, secret);
    }
    Ok(store)
}

fn join_key(key: &CredentialKey) -> String {
    format!("{}{KEY_SEPARATOR}{}", key.account(), key.username())
}

fn split_key(composite: &str) -> Result<CredentialKey> {
    let (account, username) = composite.split_once(KEY_SEPARATOR).ok_or_else(|| {
        PwVaultError::FormatError(format!("record key '{composite}' has no separator"))
    })?;

    let key = CredentialKey::new(account, Some(username))
        .map_err(|e| PwVaultError::FormatError(format!("record key '{composite}': {e}")))?;

    // Stored keys are always normalized; anything else was not written by `encode`.
    if key.account() != account || key.username() != username {
        return Err(PwVaultError::FormatError(format!(
            "record key '{composite}' is not normalized"
        )));
    }

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RecordStore {
        let mut store = RecordStore::empty();
        store.set(CredentialKey::new("github", Some("alice")).unwrap(), "S3cr3t");
        store.set(CredentialKey::new("github", Some("bob")).unwrap(), "hunter2");
        store.set(CredentialKey::new("my-bank", None).unwrap(), "p@ss w0rd\u{e9}");
        store
    }

    #[test]
    fn roundtrip_preserves_records() {
        let store = sample();
        let bytes = encode(&store).unwrap();
        assert_eq!(decode(&bytes).unwrap(), store);
    }

    #[test]
    fn roundtrip_empty_store() {
        let bytes = encode(&RecordStore::empty()).unwrap();
        assert_eq!(bytes.as_slice(), b"{}");
        assert!(decode(&bytes).unwrap().is_empty());
    }

    #[test]
    fn encoding_is_sorted_and_readable() {
        let bytes = encode(&sample()).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        let alice = text.find("github|alice").unwrap();
        let bob = text.find("github|bob").unwrap();
        let bank = text.find("my-bank|main").unwrap();
        assert!(alice < bob && bob < bank);
    }

    #[test]
    fn decode_rejects_invalid_json() {
        let err = decode(b"not json").unwrap_err();
        assert!(matches!(err, PwVaultError::FormatError(_)));
    }

    #[test]
    fn decode_rejects_non_object_document() {
        assert!(decode(b"[1,2,3]").is_err());
        assert!(decode(br#"{"acme|main": 5}"#).is_err());
    }

    #[test]
    fn decode_rejects_key_without_separator() {
        assert!(decode(br#"{"acme-main": "x"}"#).is_err());
    }

    #[test]
    fn decode_rejects_key_with_two_separators() {
        assert!(decode(br#"{"a|b|c": "x"}"#).is_err());
    }

    #[test]
    fn decode_rejects_unnormalized_key() {
        assert!(decode(br#"{"ACME|main": "x"}"#).is_err());
        assert!(decode(br#"{"acme|": "x"}"#).is_err());
    }
}
