//! The `sync` command: Steam library → Notion database

use notion_client::NotionClient;
use steam_webapi::{ApiClient, DEFAULT_API_URL};

use crate::config::SyncArgs;
use crate::game_list::{ImportMode, ImportReport, NotionGameList};
use crate::library::{FetchOptions, SteamLibrary};
use crate::output::{OutputFormat, OutputStyle};
use crate::resume::ResumeCache;

pub async fn handle(
    args: SyncArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    args.validate()?;
    let style = OutputStyle::new();

    let webapi = ApiClient::new(DEFAULT_API_URL)?.with_key(args.steam_token.as_str());
    webapi.validate_key().await?;

    let library = SteamLibrary::connect(webapi, &args.steam_user).await?;
    let mut resume = ResumeCache::open(&args.cache_file)?;

    if format == OutputFormat::Text {
        println!("{}", style.header("Fetching Steam library"));
    }
    let options = FetchOptions {
        include_free: !args.skip_free,
        skip_delisted: args.skip_delisted,
        library_only: args.library_only,
        limit: args.limit,
    };
    let games = library.fetch(&options, Some(&mut resume)).await?;
    if format == OutputFormat::Text {
        println!(
            "{}",
            style.key_value("Games fetched", &games.len().to_string())
        );
    }

    let notion = NotionClient::new(args.notion_token.as_str())?;
    let list = if let Some(database_id) = &args.database_id {
        NotionGameList::connect(notion, database_id).await?
    } else if let Some(page_id) = &args.page_id {
        NotionGameList::create(notion, page_id, &args.title).await?
    } else {
        // validate() rules this out.
        return Err("no Notion target configured".into());
    };

    let mode = if args.update {
        ImportMode::Update
    } else {
        ImportMode::SkipExisting
    };
    let report = list.import(&games, mode, args.background_cover).await;
    print_report(&report, format, &style)?;

    if report.is_success() {
        resume.discard()?;
        Ok(())
    } else {
        Err(format!("{} games failed to import", report.failures.len()).into())
    }
}

fn print_report(
    report: &ImportReport,
    format: OutputFormat,
    style: &OutputStyle,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(report)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            println!(
                "{}",
                style.success(&format!(
                    "Imported: {} created, {} updated, {} skipped",
                    report.created, report.updated, report.skipped
                ))
            );
            for failure in &report.failures {
                println!(
                    "{}",
                    style.error(&format!("  {}: {}", failure.name, failure.reason))
                );
            }
        }
    }
    Ok(())
}
