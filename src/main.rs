use clap::Parser;
use tracing::{error, Level};

use dtrade_etl::{
    cli::{init_config, run_migrate, Cli, Commands},
    configuration::{AppState, Config, State},
    error::Error,
    provider::{DatabasePool, Event, RpcLedger},
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let result = app_main().await;

    if let Err(err) = &result {
        error!("{}", err);
    }

    result
}

async fn app_main() -> Result<(), Error> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level({
            #[cfg(debug_assertions)]
            {
                Level::DEBUG
            }

            #[cfg(not(debug_assertions))]
            {
                Level::INFO
            }
        })
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Migrate) => run_migrate().await,
        Some(Commands::Run { events }) => run(events).await,
        None => run(None).await,
    }
}

async fn run(events: Option<String>) -> Result<(), Error> {
    let (config, database) = match init(events).await {
        Ok((config, database)) => (config, database),
        Err(e) => return Err(Error::ConfigurationError(e.to_string())),
    };

    let ledger = RpcLedger::new(&config)?;
    let state = State::new(config, database, Box::new(ledger));
    let app_state = AppState::new(state);

    let mut event_manager = Event::new(app_state);
    event_manager.run().await
}

async fn init(events: Option<String>) -> Result<(Config, DatabasePool), Error> {
    let mut config = init_config()?;
    if let Some(events) = events {
        config.events_source = events;
    }

    let database = DatabasePool::connect(&config).await?;
    Ok((config, database))
}
