//! WooCommerce headless CLI - session migrations and API checks.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table
//! wh-cli migrate
//!
//! # Check the WooGraphQL endpoint answers
//! wh-cli check-api
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "wh-cli")]
#[command(author, version, about = "WooCommerce headless storefront tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update the session store schema
    Migrate,
    /// Query the WooGraphQL endpoint and report what it returns
    CheckApi,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::sessions().await,
        Commands::CheckApi => commands::check_api::run().await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_subcommands() {
        assert!(matches!(
            Cli::try_parse_from(["wh-cli", "migrate"]).map(|c| c.command),
            Ok(Commands::Migrate)
        ));
        assert!(matches!(
            Cli::try_parse_from(["wh-cli", "check-api"]).map(|c| c.command),
            Ok(Commands::CheckApi)
        ));
        assert!(Cli::try_parse_from(["wh-cli", "seed"]).is_err());
    }
}
