use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod ai;
mod commands;
mod config;
mod db;
mod ledger;
mod models;
mod stats;

use ai::MealResolver;
use commands::{
    ConfigCommand, DeleteCommand, HistoryCommand, LogCommand, TodayCommand, WeekCommand,
};
use config::Config;
use db::{init_db, EntryStore};
use ledger::Ledger;

#[derive(Parser)]
#[command(name = "macrolog")]
#[command(version)]
#[command(about = "Log meals in plain language and track calorie/protein goals", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a meal from a free-text description
    Log(LogCommand),

    /// Show logged entries, newest first
    History(HistoryCommand),

    /// Delete an entry by id
    Delete(DeleteCommand),

    /// Show today's totals against goals
    Today(TodayCommand),

    /// Show the last seven days against goals
    Week(WeekCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "macrolog=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Save config path for the config command
    let cli_config_path = cli.config.clone();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Log(cmd)) => {
            let ledger = build_ledger(&config).await?;
            cmd.run(&ledger, &config).await?;
        }
        Some(Commands::History(cmd)) => {
            let ledger = build_ledger(&config).await?;
            cmd.run(&ledger)?;
        }
        Some(Commands::Delete(cmd)) => {
            let ledger = build_ledger(&config).await?;
            cmd.run(&ledger).await?;
        }
        Some(Commands::Today(cmd)) => {
            let ledger = build_ledger(&config).await?;
            cmd.run(&ledger, &config)?;
        }
        Some(Commands::Week(cmd)) => {
            let ledger = build_ledger(&config).await?;
            cmd.run(&ledger, &config)?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config, cli_config_path)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

/// Store and resolver are created once here and passed to the ledger;
/// there is no global store handle.
async fn build_ledger(config: &Config) -> Result<Ledger, Box<dyn std::error::Error>> {
    let pool = init_db(config.database_path.clone()).await?;
    let store = EntryStore::new(pool).await?;
    let resolver = MealResolver::new(&config.api_url, &config.model)?;
    Ok(Ledger::new(store, resolver))
}
