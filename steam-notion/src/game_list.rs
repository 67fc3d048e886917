//! Notion game-list binding
//!
//! Binds a Notion database to the game-list schema (title, status select,
//! genre multi-select, release date, playtime number, notes) and drives the
//! import: building property payloads from [`GameInfo`], deduplicating
//! against existing pages by name, and collecting per-game failures so one
//! bad row never aborts the batch.

use std::collections::HashMap;
use std::time::Duration;

use notion_client::{Database, NotionClient, Page, properties};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::dates::parse_release_date;
use crate::library::{GameInfo, playtime_hours};

/// Emoji used when a game has no icon of its own.
pub const PAGE_ICON: &str = "👾";

pub const PROP_NAME: &str = "Name";
pub const PROP_STATUS: &str = "Status";
pub const PROP_GENRES: &str = "Genres";
pub const PROP_RELEASE_DATE: &str = "Release date";
pub const PROP_PLAYTIME: &str = "Playtime (hours)";
pub const PROP_NOTES: &str = "Notes";

/// Pause between page writes. Notion allows roughly three requests per
/// second; pacing below that avoids tripping 429s on large libraries.
const WRITE_PACING: Duration = Duration::from_millis(350);

/// What to do when a game's page already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Leave existing pages untouched.
    SkipExisting,
    /// Rewrite the game-derived properties of existing pages.
    Update,
}

/// Outcome of one import run.
#[derive(Debug, Default, serde::Serialize)]
pub struct ImportReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failures: Vec<ImportFailure>,
}

#[derive(Debug, serde::Serialize)]
pub struct ImportFailure {
    pub name: String,
    pub reason: String,
}

impl ImportReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A game-list database bound to a Notion client.
pub struct NotionGameList {
    client: NotionClient,
    database: Database,
}

impl NotionGameList {
    /// Create a fresh game-list database under `parent_page_id`.
    pub async fn create(
        client: NotionClient,
        parent_page_id: &str,
        title: &str,
    ) -> notion_client::Result<Self> {
        let database = client
            .create_database(
                parent_page_id,
                title,
                Some(properties::emoji_icon(PAGE_ICON)),
                Self::schema(),
            )
            .await?;
        info!("created database {}", database.id);
        Ok(Self { client, database })
    }

    /// Bind to an existing database, whatever subset of the schema it has.
    pub async fn connect(client: NotionClient, database_id: &str) -> notion_client::Result<Self> {
        let database = client.database(database_id).await?;
        Ok(Self { client, database })
    }

    fn schema() -> Map<String, Value> {
        let mut schema = Map::new();
        schema.insert(PROP_NAME.to_string(), properties::title_schema());
        schema.insert(PROP_STATUS.to_string(), properties::select_schema());
        schema.insert(PROP_GENRES.to_string(), properties::multi_select_schema());
        schema.insert(PROP_RELEASE_DATE.to_string(), properties::date_schema());
        schema.insert(PROP_PLAYTIME.to_string(), properties::number_schema());
        schema.insert(PROP_NOTES.to_string(), properties::rich_text_schema());
        schema
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    fn data_source_id(&self) -> notion_client::Result<&str> {
        self.database
            .data_source_id
            .as_deref()
            .ok_or_else(|| notion_client::Error::MissingDataSource {
                database_id: self.database.id.clone(),
            })
    }

    /// Map of page title → page id for every page in the database.
    pub async fn existing_games(&self) -> notion_client::Result<HashMap<String, String>> {
        let pages = self.client.query_all_pages(self.data_source_id()?).await?;
        Ok(pages
            .into_iter()
            .filter_map(|page| page.title_text().map(|title| (title, page.id)))
            .collect())
    }

    /// Build the property payload for `game`, restricted to columns the
    /// bound database actually has. The title property keeps whatever name
    /// the database gives it.
    fn properties_for(&self, game: &GameInfo) -> notion_client::Result<Map<String, Value>> {
        let mut props = Map::new();
        props.insert(
            self.database.title_property()?.to_string(),
            properties::title(&game.name),
        );
        if self.database.has_property(PROP_GENRES) && !game.genres.is_empty() {
            props.insert(PROP_GENRES.to_string(), properties::multi_select(&game.genres));
        }
        if self.database.has_property(PROP_PLAYTIME) {
            props.insert(
                PROP_PLAYTIME.to_string(),
                properties::number(playtime_hours(game.playtime_minutes)),
            );
        }
        if self.database.has_property(PROP_RELEASE_DATE) {
            if let Some(raw) = &game.release_date {
                match parse_release_date(raw) {
                    Some(date) => {
                        props.insert(
                            PROP_RELEASE_DATE.to_string(),
                            properties::date(&date.format("%Y-%m-%d").to_string()),
                        );
                    }
                    None => debug!("unparseable release date {raw:?} for {}", game.name),
                }
            }
        }
        Ok(props)
    }

    fn icon_for(game: &GameInfo) -> Value {
        match &game.icon_uri {
            Some(uri) => properties::external_file(uri),
            None => properties::emoji_icon(PAGE_ICON),
        }
    }

    fn cover_for(game: &GameInfo, background_cover: bool) -> Option<Value> {
        let uri = if background_cover {
            game.background_uri.as_deref().or(game.logo_uri.as_deref())
        } else {
            game.logo_uri.as_deref()
        };
        uri.map(properties::external_file)
    }

    /// Create a page for `game`.
    pub async fn add_game(
        &self,
        game: &GameInfo,
        background_cover: bool,
    ) -> notion_client::Result<Page> {
        self.client
            .create_page(
                self.data_source_id()?,
                self.properties_for(game)?,
                Some(Self::icon_for(game)),
                Self::cover_for(game, background_cover),
            )
            .await
    }

    /// Rewrite the game-derived properties of an existing page.
    pub async fn update_game(
        &self,
        page_id: &str,
        game: &GameInfo,
        background_cover: bool,
    ) -> notion_client::Result<Page> {
        self.client
            .update_page(
                page_id,
                self.properties_for(game)?,
                Some(Self::icon_for(game)),
                Self::cover_for(game, background_cover),
            )
            .await
    }

    /// Import `games`, deduplicating by page title.
    ///
    /// Failures are collected per game and reported at the end; the batch
    /// keeps going. If the existing-page lookup itself fails, dedup is
    /// disabled for this run — loudly, since that can produce duplicate
    /// pages — and every game is created.
    pub async fn import(
        &self,
        games: &[GameInfo],
        mode: ImportMode,
        background_cover: bool,
    ) -> ImportReport {
        let existing = match self.existing_games().await {
            Ok(map) => Some(map),
            Err(e) => {
                warn!(
                    "could not list existing pages ({e}); duplicate detection \
                     is disabled for this run and every game will be created"
                );
                None
            }
        };

        enum Written {
            Created,
            Updated,
        }

        let mut report = ImportReport::default();
        for game in games {
            let page_id = existing
                .as_ref()
                .and_then(|map| map.get(&game.name))
                .cloned();
            let outcome = match (page_id, mode) {
                (Some(_), ImportMode::SkipExisting) => {
                    debug!("skipping existing page for {}", game.name);
                    report.skipped += 1;
                    continue;
                }
                (Some(page_id), ImportMode::Update) => self
                    .update_game(&page_id, game, background_cover)
                    .await
                    .map(|_| Written::Updated),
                (None, _) => self
                    .add_game(game, background_cover)
                    .await
                    .map(|_| Written::Created),
            };
            match outcome {
                Ok(Written::Created) => report.created += 1,
                Ok(Written::Updated) => report.updated += 1,
                Err(e) => {
                    warn!("import of {} failed: {e}", game.name);
                    report.failures.push(ImportFailure {
                        name: game.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
            tokio::time::sleep(WRITE_PACING).await;
        }
        info!(
            "import finished: {} created, {} updated, {} skipped, {} failed",
            report.created,
            report.updated,
            report.skipped,
            report.failures.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::format_playtime;
    use serde_json::json;

    fn sample_game() -> GameInfo {
        GameInfo {
            id: 70,
            name: "Half-Life".to_string(),
            genres: vec!["Action".to_string()],
            release_date: Some("8 Nov, 1998".to_string()),
            playtime: format_playtime(90),
            playtime_minutes: 90,
            icon_uri: Some("https://media.example/icon.jpg".to_string()),
            logo_uri: Some("https://media.example/logo.jpg".to_string()),
            background_uri: Some("https://media.example/bg.jpg".to_string()),
            is_free: false,
        }
    }

    fn list_with_schema(schema: Map<String, Value>) -> NotionGameList {
        NotionGameList {
            client: NotionClient::new("test-token").expect("client"),
            database: Database {
                id: "db-1".to_string(),
                data_source_id: Some("ds-1".to_string()),
                properties: schema,
            },
        }
    }

    #[test]
    fn test_properties_follow_the_schema() {
        let list = list_with_schema(NotionGameList::schema());
        let props = list.properties_for(&sample_game()).expect("props");

        assert_eq!(props[PROP_NAME], properties::title("Half-Life"));
        assert_eq!(props[PROP_GENRES], properties::multi_select(&["Action"]));
        assert_eq!(props[PROP_PLAYTIME], properties::number(1.5));
        assert_eq!(props[PROP_RELEASE_DATE], properties::date("1998-11-08"));
        // Notes and Status are user-managed; imports never write them.
        assert!(!props.contains_key(PROP_NOTES));
        assert!(!props.contains_key(PROP_STATUS));
    }

    #[test]
    fn test_missing_columns_are_not_written() {
        let schema: Map<String, Value> = serde_json::from_value(json!({
            "Game": {"type": "title", "title": {}}
        }))
        .expect("schema");
        let list = list_with_schema(schema);
        let props = list.properties_for(&sample_game()).expect("props");

        // The title lands under the database's own title column name.
        assert_eq!(props["Game"], properties::title("Half-Life"));
        assert!(!props.contains_key(PROP_GENRES));
        assert!(!props.contains_key(PROP_PLAYTIME));
        assert!(!props.contains_key(PROP_RELEASE_DATE));
    }

    #[test]
    fn test_unparseable_date_is_dropped() {
        let list = list_with_schema(NotionGameList::schema());
        let mut game = sample_game();
        game.release_date = Some("Coming soon".to_string());
        let props = list.properties_for(&game).expect("props");
        assert!(!props.contains_key(PROP_RELEASE_DATE));
    }

    #[test]
    fn test_icon_and_cover_selection() {
        let game = sample_game();
        assert_eq!(
            NotionGameList::icon_for(&game),
            properties::external_file("https://media.example/icon.jpg")
        );
        assert_eq!(
            NotionGameList::cover_for(&game, false),
            Some(properties::external_file("https://media.example/logo.jpg"))
        );
        assert_eq!(
            NotionGameList::cover_for(&game, true),
            Some(properties::external_file("https://media.example/bg.jpg"))
        );

        let mut bare = game;
        bare.icon_uri = None;
        bare.background_uri = None;
        bare.logo_uri = None;
        assert_eq!(NotionGameList::icon_for(&bare), properties::emoji_icon(PAGE_ICON));
        assert_eq!(NotionGameList::cover_for(&bare, true), None);
    }
}
