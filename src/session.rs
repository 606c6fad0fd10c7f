//! Master-password gate.
//!
//! `Session::authenticate` is the only way to obtain an `Authorized`
//! value, and every credential operation takes `&Authorized`.  A denied
//! check therefore cannot reach the vault.

use subtle::ConstantTimeEq;
use tracing::debug;

use crate::crypto::kdf;
use crate::errors::{PwVaultError, Result};

/// Proof that the master password was checked in this process.
///
/// Carries no token or expiry; the CLI re-checks on every invocation.
#[derive(Debug)]
pub struct Authorized {
    _private: (),
}

/// Stateless master-password check.
pub struct Session;

impl Session {
    /// Compare the supplied master password with the configured one.
    ///
    /// `expected` is either a plaintext value (compared in constant time)
    /// or an Argon2 PHC hash written by setup or rotation.  An empty
    /// supplied password is always denied.
    pub fn authenticate(supplied: &str, expected: &str) -> Result<Authorized> {
        if supplied.is_empty() || expected.is_empty() {
            debug!("master password check denied");
            return Err(PwVaultError::AuthDenied);
        }

        let matches = if kdf::is_password_hash(expected) {
            kdf::verify_master_password(supplied.as_bytes(), expected)?
        } else {
            supplied.as_bytes().ct_eq(expected.as_bytes()).into()
        };

        if matches {
            debug!("master password accepted");
            Ok(Authorized { _private: () })
        } else {
            debug!("master password check denied");
            Err(PwVaultError::AuthDenied)
        }
    }
}
