//! Steam → Notion sync library
//!
//! This library backs the `steam-notion` CLI: it fetches a Steam game
//! library (optionally enriched from the storefront), and imports it into a
//! Notion database with dedup, update mode, and a resume cache for
//! interrupted runs.

pub mod commands;
pub mod config;
pub mod dates;
pub mod game_list;
pub mod library;
pub mod output;
pub mod resume;

pub use config::SyncArgs;
pub use output::OutputFormat;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum LibraryCommands {
    /// Fetch and list the game library
    List {
        /// Steam Web API key
        #[arg(long, env = "STEAM_TOKEN", hide_env_values = true)]
        steam_token: String,

        /// Steam user: SteamID64, vanity name, or pasted profile URL
        #[arg(long, env = "STEAM_USER")]
        steam_user: String,

        /// Include free games with recorded playtime
        #[arg(long)]
        include_free: bool,

        /// Use only the Web API listing; no storefront enrichment
        #[arg(long)]
        library_only: bool,

        /// Sort by descending playtime instead of name
        #[arg(long)]
        by_playtime: bool,

        /// Show at most this many games
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand)]
pub enum DatabaseCommands {
    /// Create a new game-list database under a parent page
    Create {
        /// Notion integration token
        #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
        notion_token: String,

        /// Parent page ID
        #[arg(long, env = "NOTION_PAGE_ID")]
        page_id: String,

        /// Database title
        #[arg(long, default_value = "Game List")]
        title: String,
    },

    /// List the games already in a database
    Games {
        /// Notion integration token
        #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
        notion_token: String,

        /// Database ID
        #[arg(long, env = "NOTION_DATABASE_ID")]
        database_id: String,
    },
}
