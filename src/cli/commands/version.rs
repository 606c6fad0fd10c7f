//! `--version`: display the version.

use crate::errors::Result;

/// Execute the version action.
pub fn execute() -> Result<()> {
    let current = env!("CARGO_PKG_VERSION");
    println!("pwvault {current}");
    Ok(())
}
