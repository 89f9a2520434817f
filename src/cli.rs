//! Command-line interface
//!
//! `run` (the default) consumes the configured event source; `migrate` only
//! applies the schema.

use clap::{Parser, Subcommand};

use crate::{
    configuration::{get_configuration, set_configuration, Config},
    error::Error,
    helpers::Store_Backend,
    migration,
};

/// dTrade log-event indexer
#[derive(Parser)]
#[command(name = "dtrade-etl")]
#[command(about = "Aggregates dTrade contract events into derived entities", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process events from EVENTS_SOURCE (default if no command specified)
    Run {
        /// Read events from this file instead, `-` for stdin
        #[arg(long)]
        events: Option<String>,
    },

    /// Run database migrations
    Migrate,
}

/// Initialize configuration and return Config
pub fn init_config() -> Result<Config, Error> {
    set_configuration()?;
    get_configuration()
}

pub async fn run_migrate() -> Result<(), Error> {
    let config = init_config()?;

    if config.store_backend != Store_Backend::Postgres {
        tracing::info!(
            "Store backend is {}, nothing to migrate",
            config.store_backend
        );
        return Ok(());
    }

    let applied = migration::run_migrations(&config.database_url).await?;
    tracing::info!("Migrations complete, {} applied", applied.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cli = Cli::parse_from(["dtrade-etl"]);
        assert!(cli.command.is_none());

        let cli = Cli::parse_from(["dtrade-etl", "run", "--events", "events.ndjson"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Run { events: Some(ref path) }) if path == "events.ndjson"
        ));

        let cli = Cli::parse_from(["dtrade-etl", "migrate"]);
        assert!(matches!(cli.command, Some(Commands::Migrate)));
    }
}
