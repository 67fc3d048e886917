//! Steam application (game) read-model

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cache::{INFINITE, PropertyCache};
use crate::client::{ApiClient, ApiParams};
use crate::error::{Error, Result};
use crate::response::ApiResponse;

const SCHEMA: &str = "schema";

/// Name used when neither the library entry nor the stats schema knows one.
/// Delisted titles commonly end up here.
pub const UNKNOWN_APP_NAME: &str = "<Unknown>";

/// One game in a user's library.
///
/// Carries the data the owned-games listing already returned (playtimes,
/// icon hashes) and lazily fetches the stats schema when achievement or
/// name fallback data is needed. The schema never changes for a given
/// appid, so it is cached without a TTL.
#[derive(Debug)]
pub struct SteamApp {
    client: ApiClient,
    appid: u64,
    owner: u64,
    name: Option<String>,
    playtime_forever: u64,
    playtime_2weeks: Option<u64>,
    img_icon_hash: Option<String>,
    img_logo_hash: Option<String>,
    cache: PropertyCache,
}

/// One achievement, merged from the game schema, the global unlock
/// percentages and the owner's own stats.
#[derive(Debug, Clone, PartialEq)]
pub struct SteamAchievement {
    pub api_name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub hidden: bool,
    pub unlocked: bool,
    pub unlock_time: Option<DateTime<Utc>>,
    pub global_percent: Option<f64>,
}

impl SteamApp {
    /// Build from one entry of an owned-games or recently-played listing.
    ///
    /// Only `appid` is required; everything else in the entry is optional
    /// and absent fields degrade to defaults rather than failing the whole
    /// library fetch.
    pub fn from_owned_entry(client: ApiClient, entry: &ApiResponse, owner: u64) -> Result<Self> {
        let appid = entry.unsigned_of("appid")?;
        Ok(Self {
            client,
            appid,
            owner,
            name: entry.get("name").and_then(|v| v.as_str().map(str::to_owned)),
            playtime_forever: entry
                .get("playtime_forever")
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
            playtime_2weeks: entry.get("playtime_2weeks").and_then(|v| v.as_u64()),
            img_icon_hash: entry
                .get("img_icon_url")
                .and_then(|v| v.as_str().map(str::to_owned)),
            img_logo_hash: entry
                .get("img_logo_url")
                .and_then(|v| v.as_str().map(str::to_owned)),
            cache: PropertyCache::new(),
        })
    }

    /// Bind to a bare appid with no listing data.
    pub fn new(client: ApiClient, appid: u64, owner: u64) -> Self {
        Self {
            client,
            appid,
            owner,
            name: None,
            playtime_forever: 0,
            playtime_2weeks: None,
            img_icon_hash: None,
            img_logo_hash: None,
            cache: PropertyCache::new(),
        }
    }

    pub fn appid(&self) -> u64 {
        self.appid
    }

    /// Steam ID of the owning user.
    pub fn owner(&self) -> u64 {
        self.owner
    }

    /// Total recorded playtime in minutes.
    pub fn playtime_forever(&self) -> u64 {
        self.playtime_forever
    }

    /// Playtime over the last two weeks in minutes, when the listing
    /// reported any.
    pub fn playtime_2weeks(&self) -> Option<u64> {
        self.playtime_2weeks
    }

    /// Icon image hash from the listing, if present.
    pub fn img_icon_hash(&self) -> Option<&str> {
        self.img_icon_hash.as_deref()
    }

    /// Logo image hash from the listing, if present.
    pub fn img_logo_hash(&self) -> Option<&str> {
        self.img_logo_hash.as_deref()
    }

    /// The name from the listing, when the listing carried one.
    pub fn listed_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The display name.
    ///
    /// Prefers the name the library listing carried; falls back to the
    /// stats schema's `gameName`, and finally to [`UNKNOWN_APP_NAME`] for
    /// titles the API no longer describes.
    pub async fn name(&self) -> Result<String> {
        if let Some(name) = &self.name {
            return Ok(name.clone());
        }
        let schema = self.schema().await?;
        Ok(schema
            .get("gameName")
            .and_then(|v| v.as_str().map(str::to_owned))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNKNOWN_APP_NAME.to_string()))
    }

    /// The stats schema document (`GetSchemaForGame`), cached forever.
    ///
    /// Apps without published stats yield an empty document.
    pub async fn schema(&self) -> Result<ApiResponse> {
        if let Some(doc) = self.cache.fresh(SCHEMA, INFINITE) {
            return Ok(doc);
        }
        let response = self
            .client
            .call(
                "ISteamUserStats",
                "GetSchemaForGame",
                "v2",
                ApiParams::new().push("appid", self.appid),
            )
            .await?;
        let doc = response
            .get("game")
            .unwrap_or_else(|| ApiResponse::new(serde_json::json!({})));
        self.cache.store(SCHEMA, doc.clone());
        Ok(doc)
    }

    /// Achievements for this game, with the owner's unlock state and the
    /// global unlock percentage merged in.
    ///
    /// Games without achievements return an empty list. The owner's stats
    /// call fails with a 400 when the owner never launched the game; that
    /// degrades to "nothing unlocked" rather than an error.
    pub async fn achievements(&self) -> Result<Vec<SteamAchievement>> {
        let schema = self.schema().await?;
        let Some(schema_achievements) = schema
            .get("availableGameStats")
            .and_then(|stats| stats.get("achievements"))
        else {
            return Ok(Vec::new());
        };

        let global = self.global_percentages().await?;
        let unlocked = self.owner_unlocks().await?;

        let mut achievements = Vec::new();
        for entry in schema_achievements.elements() {
            let api_name = entry.string_of("name")?;
            let (is_unlocked, unlock_time) = unlocked
                .iter()
                .find(|(name, _, _)| name == &api_name)
                .map_or((false, None), |(_, achieved, time)| (*achieved, *time));
            achievements.push(SteamAchievement {
                global_percent: global
                    .iter()
                    .find(|(name, _)| name == &api_name)
                    .map(|(_, pct)| *pct),
                display_name: entry.string_of("displayName")?,
                description: entry
                    .get("description")
                    .and_then(|v| v.as_str().map(str::to_owned)),
                hidden: entry.get("hidden").map(|v| v.boolean()).transpose()?.unwrap_or(false),
                unlocked: is_unlocked,
                unlock_time,
                api_name,
            });
        }
        Ok(achievements)
    }

    async fn global_percentages(&self) -> Result<Vec<(String, f64)>> {
        let response = self
            .client
            .call(
                "ISteamUserStats",
                "GetGlobalAchievementPercentagesForApp",
                "v0002",
                ApiParams::new().push("gameid", self.appid),
            )
            .await?;
        let mut percentages = Vec::new();
        if let Some(list) = response
            .get("achievementpercentages")
            .and_then(|p| p.get("achievements"))
        {
            for entry in list.elements() {
                // Percent arrives as a number or a numeric string.
                let percent = entry
                    .get("percent")
                    .and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.parse().ok())));
                if let (Ok(name), Some(percent)) = (entry.string_of("name"), percent) {
                    percentages.push((name, percent));
                }
            }
        }
        Ok(percentages)
    }

    async fn owner_unlocks(&self) -> Result<Vec<(String, bool, Option<DateTime<Utc>>)>> {
        let result = self
            .client
            .call(
                "ISteamUserStats",
                "GetUserStatsForGame",
                "v2",
                ApiParams::new()
                    .push("steamid", self.owner)
                    .push("appid", self.appid),
            )
            .await;
        let response = match result {
            Ok(response) => response,
            // No stats recorded for this owner and app.
            Err(Error::BadCall { .. }) => {
                debug!("no user stats for app {}, owner {}", self.appid, self.owner);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut unlocks = Vec::new();
        if let Some(list) = response
            .get("playerstats")
            .and_then(|p| p.get("achievements"))
        {
            for entry in list.elements() {
                let achieved = entry
                    .get("achieved")
                    .map(|v| v.boolean())
                    .transpose()?
                    .unwrap_or(false);
                let unlock_time = entry
                    .get("unlocktime")
                    .and_then(|v| v.as_i64())
                    .filter(|t| *t > 0)
                    .and_then(|t| DateTime::<Utc>::from_timestamp(t, 0));
                unlocks.push((entry.string_of("name")?, achieved, unlock_time));
            }
        }
        Ok(unlocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> ApiClient {
        ApiClient::new("https://api.example.com").expect("client")
    }

    #[test]
    fn test_from_owned_entry_full() {
        let entry = ApiResponse::new(json!({
            "appid": 440,
            "name": "Team Fortress 2",
            "playtime_forever": 6135,
            "playtime_2weeks": 120,
            "img_icon_url": "e3f595a92552da3d664ad00277fad2107345f743"
        }));
        let app = SteamApp::from_owned_entry(client(), &entry, 1).expect("app");
        assert_eq!(app.appid(), 440);
        assert_eq!(app.listed_name(), Some("Team Fortress 2"));
        assert_eq!(app.playtime_forever(), 6135);
        assert_eq!(app.playtime_2weeks(), Some(120));
        assert_eq!(
            app.img_icon_hash(),
            Some("e3f595a92552da3d664ad00277fad2107345f743")
        );
    }

    #[test]
    fn test_from_owned_entry_sparse() {
        let entry = ApiResponse::new(json!({"appid": 730}));
        let app = SteamApp::from_owned_entry(client(), &entry, 1).expect("app");
        assert_eq!(app.appid(), 730);
        assert_eq!(app.listed_name(), None);
        assert_eq!(app.playtime_forever(), 0);
        assert_eq!(app.playtime_2weeks(), None);
    }

    #[test]
    fn test_appid_is_required() {
        let entry = ApiResponse::new(json!({"name": "mystery"}));
        assert!(matches!(
            SteamApp::from_owned_entry(client(), &entry, 1),
            Err(Error::MissingField { field }) if field == "appid"
        ));
    }
}
