use clap::{Parser, Subcommand};
use tracing::Level;

use steam_notion::{DatabaseCommands, LibraryCommands, OutputFormat, SyncArgs, commands};

#[derive(Parser)]
#[command(
    name = "steam-notion",
    about = "Sync a Steam game library into a Notion database",
    version,
    author,
    long_about = "Fetches a user's Steam library (optionally enriched with storefront \
                  details such as genres, release dates and artwork) and imports it into \
                  a Notion database, creating the database if needed."
)]
struct Cli {
    /// Set the logging level
    #[arg(short, long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Output format
    #[arg(short = 'o', long, value_enum, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Sync the Steam library into a Notion database
    Sync(SyncArgs),

    /// Inspect the Steam library without touching Notion
    #[command(subcommand)]
    Library(LibraryCommands),

    /// Manage the Notion game-list database
    #[command(subcommand)]
    Database(DatabaseCommands),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .init();

    match cli.command {
        Commands::Sync(args) => commands::sync::handle(args, cli.format).await?,
        Commands::Library(cmd) => commands::library::handle(cmd, cli.format).await?,
        Commands::Database(cmd) => commands::database::handle(cmd, cli.format).await?,
    }

    Ok(())
}
