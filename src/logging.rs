//! Diagnostic logging setup.
//!
//! Events go to stderr so stdout stays usable for `--print`.  The filter
//! comes from `PWVAULT_LOG` (e.g. `PWVAULT_LOG=pwvault=debug`) and
//! defaults to warnings only.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "PWVAULT_LOG";

/// Install the global `tracing` subscriber.  Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
