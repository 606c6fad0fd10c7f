use clap::Parser;
use pwvault::cli::{output, Action, Cli};
use pwvault::errors::PwVaultError;

fn main() {
    let cli = Cli::parse();
    pwvault::logging::init();

    let result = match cli.action() {
        Action::Retrieve => pwvault::cli::commands::get::execute(&cli),
        Action::Save => pwvault::cli::commands::save::execute(&cli),
        Action::GetAll => pwvault::cli::commands::list::execute(&cli),
        Action::Reset => pwvault::cli::commands::reset::execute(&cli),
        Action::ResetMasterPassword => pwvault::cli::commands::rotate::execute(&cli),
        Action::Version => pwvault::cli::commands::version::execute(),
        Action::Init => pwvault::cli::commands::init::execute(&cli),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        match e {
            PwVaultError::ConfigMissing(_) => {
                output::tip("Run `pwvault --init` to create a configuration.");
            }
            PwVaultError::VaultCorrupted { .. } => {
                output::tip("Check SECRET_KEY, or run `pwvault --reset` to start over.");
            }
            _ => {}
        }
        std::process::exit(1);
    }
}
