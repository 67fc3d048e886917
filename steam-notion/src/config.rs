//! Sync configuration
//!
//! Every credential and switch can come from the environment, so the tool
//! runs unattended from a `.env`-style wrapper or a scheduler without a
//! long flag list.

use std::path::PathBuf;

use anyhow::bail;
use clap::Args;

use crate::resume::DEFAULT_CACHE_FILE;

/// Arguments for the `sync` command.
#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    /// Steam Web API key
    #[arg(long, env = "STEAM_TOKEN", hide_env_values = true)]
    pub steam_token: String,

    /// Steam user: SteamID64, vanity name, or pasted profile URL
    #[arg(long, env = "STEAM_USER")]
    pub steam_user: String,

    /// Notion integration token
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    pub notion_token: String,

    /// Parent page under which a new database is created
    #[arg(long, env = "NOTION_PAGE_ID")]
    pub page_id: Option<String>,

    /// Existing database to import into (takes precedence over --page-id)
    #[arg(long, env = "NOTION_DATABASE_ID")]
    pub database_id: Option<String>,

    /// Title used when creating a new database
    #[arg(long, default_value = "Game List")]
    pub title: String,

    /// Update pages that already exist instead of skipping them
    #[arg(long, env = "UPDATE_MODE")]
    pub update: bool,

    /// Skip free games
    #[arg(long, env = "SKIP_FREE_STEAM")]
    pub skip_free: bool,

    /// Skip games the storefront no longer lists
    #[arg(long, env = "SKIP_NON_STEAM")]
    pub skip_delisted: bool,

    /// Use only the Web API listing; no storefront enrichment
    #[arg(long, env = "USE_ONLY_LIBRARY")]
    pub library_only: bool,

    /// Use the store background image as the page cover
    #[arg(long, env = "STORE_BG_COVER")]
    pub background_cover: bool,

    /// Import at most this many games
    #[arg(long, env = "TEST_LIMIT")]
    pub limit: Option<usize>,

    /// Resume cache file
    #[arg(long, default_value = DEFAULT_CACHE_FILE)]
    pub cache_file: PathBuf,
}

impl SyncArgs {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.page_id.is_none() && self.database_id.is_none() {
            bail!("either --database-id or --page-id (or their environment variables) is required");
        }
        // Delisted detection needs the storefront, which library-only mode
        // never contacts.
        if self.skip_delisted && self.library_only {
            bail!("--skip-delisted and --library-only are mutually exclusive");
        }
        Ok(())
    }
}
