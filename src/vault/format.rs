//! Vault blob envelope.
//!
//! A `.vault` file has this layout:
//!
//! ```text
//! [PWVL: 4 bytes][version: 1 byte][nonce: 12 bytes][ciphertext + GCM tag: 16 bytes]
//! ```
//!
//! - **Magic** (`PWVL`): identifies the file as a pwvault blob.
//! - **Version**: envelope version (currently `1`).
//! - **Nonce / ciphertext / tag**: output of `crypto::encrypt`.
//!
//! The 5-byte header is passed to AES-GCM as associated data, so a change
//! to any byte of the file fails authentication.

use zeroize::Zeroizing;

use crate::crypto::encryption::{self, NONCE_LEN, TAG_LEN};
use crate::errors::Result;

/// Magic bytes at the start of every vault file.
const MAGIC: &[u8; 4] = b"PWVL";

/// Current envelope version.
pub const CURRENT_VERSION: u8 = 1;

/// Fixed-size header: 4 (magic) + 1 (version).
const HEADER_LEN: usize = 5;

/// Smallest possible blob: header, nonce and tag around an empty plaintext.
pub const MIN_BLOB_LEN: usize = HEADER_LEN + NONCE_LEN + TAG_LEN;

/// Why a blob could not be opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    TooShort,
    BadMagic,
    UnsupportedVersion(u8),
    AuthenticationFailed,
}

impl std::fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooShort => write!(f, "file too small to be a valid vault"),
            Self::BadMagic => write!(f, "missing PWVL magic bytes"),
            Self::UnsupportedVersion(v) => {
                write!(f, "unsupported version {v}, expected {CURRENT_VERSION}")
            }
            Self::AuthenticationFailed => {
                write!(f, "authentication failed (wrong key or tampered data)")
            }
        }
    }
}

fn header() -> [u8; HEADER_LEN] {
    let mut h = [0u8; HEADER_LEN];
    h[..4].copy_from_slice(MAGIC);
    h[4] = CURRENT_VERSION;
    h
}

/// Encrypt `plaintext` under `key` and wrap it in the envelope.
pub fn seal(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let header = header();
    let body = encryption::encrypt(key, plaintext, &header)?;

    let mut buf = Vec::with_capacity(HEADER_LEN + body.len());
    buf.extend_from_slice(&header);
    buf.extend_from_slice(&body);
    Ok(buf)
}

/// Validate the envelope and decrypt its contents.
pub fn open(key: &[u8], blob: &[u8]) -> std::result::Result<Zeroizing<Vec<u8>>, EnvelopeError> {
    if blob.len() < MIN_BLOB_LEN {
        return Err(EnvelopeError::TooShort);
    }
    if &blob[..4] != MAGIC {
        return Err(EnvelopeError::BadMagic);
    }
    if blob[4] != CURRENT_VERSION {
        return Err(EnvelopeError::UnsupportedVersion(blob[4]));
    }

    let (header, body) = blob.split_at(HEADER_LEN);
    encryption::decrypt(key, body, header)
        .map(Zeroizing::new)
        .map_err(|_| EnvelopeError::AuthenticationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [0x5Au8; 32];

    #[test]
    fn seal_then_open() {
        let blob = seal(&KEY, b"{\"acme|main\":\"p1\"}").unwrap();
        assert_eq!(&blob[..4], MAGIC);
        assert_eq!(blob[4], CURRENT_VERSION);
        assert_eq!(open(&KEY, &blob).unwrap().as_slice(), b"{\"acme|main\":\"p1\"}");
    }

    #[test]
    fn empty_plaintext_has_minimum_length() {
        let blob = seal(&KEY, b"").unwrap();
        assert_eq!(blob.len(), MIN_BLOB_LEN);
        assert!(open(&KEY, &blob).unwrap().is_empty());
    }

    #[test]
    fn rejects_short_blob() {
        assert_eq!(open(&KEY, b"PWVL\x01"), Err(EnvelopeError::TooShort));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut blob = seal(&KEY, b"x").unwrap();
        blob[0] = b'X';
        assert_eq!(open(&KEY, &blob), Err(EnvelopeError::BadMagic));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut blob = seal(&KEY, b"x").unwrap();
        blob[4] = 9;
        assert_eq!(open(&KEY, &blob), Err(EnvelopeError::UnsupportedVersion(9)));
    }

    #[test]
    fn rejects_wrong_key() {
        let blob = seal(&KEY, b"x").unwrap();
        assert_eq!(
            open(&[0x11u8; 32], &blob),
            Err(EnvelopeError::AuthenticationFailed)
        );
    }
}
