//! The `database` commands: manage the Notion side

use notion_client::NotionClient;
use serde_json::json;

use crate::DatabaseCommands;
use crate::game_list::NotionGameList;
use crate::output::{OutputFormat, OutputStyle};

pub async fn handle(
    cmd: DatabaseCommands,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        DatabaseCommands::Create {
            notion_token,
            page_id,
            title,
        } => create_database(notion_token, page_id, title, format).await,
        DatabaseCommands::Games {
            notion_token,
            database_id,
        } => list_games(notion_token, database_id, format).await,
    }
}

async fn create_database(
    notion_token: String,
    page_id: String,
    title: String,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = NotionClient::new(notion_token)?;
    let list = NotionGameList::create(client, &page_id, &title).await?;
    let database = list.database();

    match format {
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let payload = json!({
                "id": database.id,
                "data_source_id": database.data_source_id,
            });
            let output = if format == OutputFormat::JsonPretty {
                serde_json::to_string_pretty(&payload)?
            } else {
                serde_json::to_string(&payload)?
            };
            println!("{output}");
        }
        OutputFormat::Text => {
            let style = OutputStyle::new();
            println!("{}", style.success("Database created"));
            println!("{}", style.key_value("ID", &database.id));
            if let Some(ds) = &database.data_source_id {
                println!("{}", style.key_value("Data source", ds));
            }
        }
    }
    Ok(())
}

async fn list_games(
    notion_token: String,
    database_id: String,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = NotionClient::new(notion_token)?;
    let list = NotionGameList::connect(client, &database_id).await?;
    let mut names: Vec<String> = list.existing_games().await?.into_keys().collect();
    names.sort();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&names)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&names)?),
        OutputFormat::Text => {
            let style = OutputStyle::new();
            for name in &names {
                println!("{name}");
            }
            println!("{}", style.key_value("Total", &names.len().to_string()));
        }
    }
    Ok(())
}
