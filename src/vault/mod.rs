//! Vault module: encrypted credential storage.
//!
//! This module provides:
//! - `CredentialKey` and `RecordStore`, the record model (`record`)
//! - JSON serialization of the record model (`codec`)
//! - The authenticated blob envelope (`format`)
//! - A cross-process advisory lock (`lock`)
//! - The `Vault` handle that loads, saves and destroys the blob (`store`)

pub mod codec;
pub mod format;
pub mod lock;
pub mod record;
pub mod store;

pub use lock::VaultLock;
pub use record::{CredentialKey, RecordStore, DEFAULT_USERNAME, KEY_SEPARATOR};
pub use store::{DestroyOutcome, Vault};
