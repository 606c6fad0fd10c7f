//! Key Material: the vault's symmetric secret.
//!
//! Key Material is 32 random bytes generated once at setup and stored
//! base64-encoded in the configuration as `SECRET_KEY`.  It is never used
//! directly as a cipher key; the blob encryption key is derived from it
//! with HKDF-SHA256 so the raw configured secret is bound to one purpose.

use std::fmt;

use base64::engine::general_purpose::{STANDARD as BASE64, URL_SAFE};
use base64::Engine;
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{PwVaultError, Result};

/// Length of Key Material and of derived sub-keys (256 bits).
pub const KEY_LEN: usize = 32;

/// HKDF `info` string for the vault blob encryption key.
const BLOB_KEY_INFO: &[u8] = b"pwvault-blob-key";

/// A 32-byte secret that automatically zeroes its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct KeyMaterial {
    bytes: [u8; KEY_LEN],
}

impl KeyMaterial {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Generate fresh random Key Material (used by first-run setup).
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::rng().fill_bytes(&mut bytes);
        let key = Self::new(bytes);
        bytes.zeroize();
        key
    }

    /// Parse Key Material from its configured text form.
    ///
    /// Accepts standard or URL-safe base64 (padded). The decoded value
    /// must be exactly 32 bytes.
    pub fn from_encoded(encoded: &str) -> Result<Self> {
        let trimmed = encoded.trim();
        if trimmed.is_empty() {
            return Err(PwVaultError::InvalidKeyMaterial("value is empty".into()));
        }

        let decoded = BASE64
            .decode(trimmed)
            .or_else(|_| URL_SAFE.decode(trimmed))
            .map_err(|_| PwVaultError::InvalidKeyMaterial("not valid base64".into()))?;
        let decoded = Zeroizing::new(decoded);

        if decoded.len() != KEY_LEN {
            return Err(PwVaultError::InvalidKeyMaterial(format!(
                "expected {KEY_LEN} bytes, got {}",
                decoded.len()
            )));
        }

        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&decoded);
        let key = Self::new(bytes);
        bytes.zeroize();
        Ok(key)
    }

    /// Encode as standard base64 for writing into the configuration.
    pub fn to_encoded(&self) -> Zeroizing<String> {
        Zeroizing::new(BASE64.encode(self.bytes))
    }

    /// Derive the AES-256-GCM key used for the vault blob.
    pub fn blob_key(&self) -> Result<Zeroizing<[u8; KEY_LEN]>> {
        hkdf_derive(&self.bytes, BLOB_KEY_INFO)
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Run HKDF-SHA256 expand with the given `info`.
///
/// The extract step uses no salt; Key Material is already uniformly random.
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = Zeroizing::new([0u8; KEY_LEN]);
    hk.expand(info, &mut okm[..])
        .map_err(|e| PwVaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_key_roundtrips() {
        let key = KeyMaterial::generate();
        let encoded = key.to_encoded();
        let parsed = KeyMaterial::from_encoded(&encoded).unwrap();
        assert_eq!(
            key.blob_key().unwrap().as_slice(),
            parsed.blob_key().unwrap().as_slice()
        );
    }

    #[test]
    fn accepts_url_safe_base64() {
        // 32 bytes of 0xFB encode to a string containing '-' and '_' in URL-safe form.
        let encoded = URL_SAFE.encode([0xFBu8; KEY_LEN]);
        assert!(encoded.contains('-') || encoded.contains('_'));
        assert!(KeyMaterial::from_encoded(&encoded).is_ok());
    }

    #[test]
    fn rejects_wrong_length() {
        let encoded = BASE64.encode([1u8; 16]);
        let err = KeyMaterial::from_encoded(&encoded).unwrap_err();
        assert!(matches!(err, PwVaultError::InvalidKeyMaterial(_)));
    }

    #[test]
    fn rejects_garbage_and_empty() {
        assert!(KeyMaterial::from_encoded("not base64 !!").is_err());
        assert!(KeyMaterial::from_encoded("   ").is_err());
    }

    #[test]
    fn blob_key_differs_from_raw_material() {
        let key = KeyMaterial::new([7u8; KEY_LEN]);
        let derived = key.blob_key().unwrap();
        assert_ne!(derived.as_slice(), &[7u8; KEY_LEN]);
    }

    #[test]
    fn generated_keys_are_distinct() {
        let a = KeyMaterial::generate();
        let b = KeyMaterial::generate();
        assert_ne!(a.to_encoded(), b.to_encoded());
    }

    #[test]
    fn debug_output_is_redacted() {
        let key = KeyMaterial::new([9u8; KEY_LEN]);
        let shown = format!("{key:?}");
        assert!(shown.contains("REDACTED"));
        assert!(!shown.contains('9'));
    }
}
