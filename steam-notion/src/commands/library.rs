//! The `library` commands: inspect the Steam side without touching Notion

use comfy_table::Cell;
use steam_webapi::{ApiClient, DEFAULT_API_URL};

use crate::LibraryCommands;
use crate::library::{FetchOptions, SteamLibrary, by_playtime};
use crate::output::{OutputFormat, OutputStyle};

pub async fn handle(
    cmd: LibraryCommands,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        LibraryCommands::List {
            steam_token,
            steam_user,
            include_free,
            library_only,
            by_playtime: sort_by_playtime,
            limit,
        } => {
            list_games(
                steam_token,
                steam_user,
                include_free,
                library_only,
                sort_by_playtime,
                limit,
                format,
            )
            .await
        }
    }
}

#[allow(clippy::fn_params_excessive_bools)]
async fn list_games(
    steam_token: String,
    steam_user: String,
    include_free: bool,
    library_only: bool,
    sort_by_playtime: bool,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let webapi = ApiClient::new(DEFAULT_API_URL)?.with_key(steam_token);
    let library = SteamLibrary::connect(webapi, &steam_user).await?;
    let options = FetchOptions {
        include_free,
        skip_delisted: false,
        library_only,
        limit,
    };
    let mut games = library.fetch(&options, None).await?;
    if sort_by_playtime {
        by_playtime(&mut games);
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&games)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&games)?),
        OutputFormat::Text => {
            let style = OutputStyle::new();
            let mut table = style.table();
            table.set_header(vec!["Name", "Playtime", "Release date", "Genres"]);
            for game in &games {
                table.add_row(vec![
                    Cell::new(&game.name),
                    Cell::new(&game.playtime),
                    Cell::new(game.release_date.as_deref().unwrap_or("-")),
                    Cell::new(game.genres.join(", ")),
                ]);
            }
            println!("{table}");
            println!("{}", style.key_value("Total", &games.len().to_string()));
        }
    }
    Ok(())
}
