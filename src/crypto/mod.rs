//! Cryptographic primitives for pwvault.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - Key Material handling and HKDF sub-key derivation (`keys`)
//! - Argon2id master-password hashing (`kdf`)

pub mod encryption;
pub mod kdf;
pub mod keys;

pub use encryption::{decrypt, encrypt};
pub use kdf::{hash_master_password, is_password_hash, verify_master_password, Argon2Params};
pub use keys::KeyMaterial;
