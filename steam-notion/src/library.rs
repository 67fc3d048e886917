//! Steam library fetching and enrichment
//!
//! [`SteamLibrary`] resolves the configured user, walks the owned-games
//! list alphabetically and turns each entry into a [`GameInfo`]: the flat,
//! serializable record the importer and the resume cache work with.
//! Storefront enrichment (genres become platforms-agnostic tags, release
//! date, artwork, free flag) is optional; in library-only mode the Web API
//! listing is all there is.

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use steam_store::StoreClient;
use steam_webapi::{ApiClient, SteamApp, SteamUser};
use tracing::{debug, info, warn};

use crate::resume::ResumeCache;

/// Accepted prefixes when the user pastes a whole profile URL.
const PROFILE_URL_PREFIXES: &[&str] = &[
    "https://steamcommunity.com/id/",
    "http://steamcommunity.com/id/",
    "steamcommunity.com/id/",
    "https://steamcommunity.com/profiles/",
    "http://steamcommunity.com/profiles/",
    "steamcommunity.com/profiles/",
];

/// One game, flattened for import and the resume cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameInfo {
    pub id: u64,
    pub name: String,
    /// Genre tags from the storefront; empty in library-only mode.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Localized storefront release-date string, when known.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Human playtime ("never played", "45 minutes", "12.3 hours").
    pub playtime: String,
    pub playtime_minutes: u64,
    #[serde(default)]
    pub icon_uri: Option<String>,
    #[serde(default)]
    pub logo_uri: Option<String>,
    #[serde(default)]
    pub background_uri: Option<String>,
    #[serde(default)]
    pub is_free: bool,
}

/// Options for one library fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Include free games with recorded playtime.
    pub include_free: bool,
    /// Drop games the storefront no longer lists.
    pub skip_delisted: bool,
    /// Skip storefront enrichment entirely.
    pub library_only: bool,
    /// Stop after this many games.
    pub limit: Option<usize>,
}

/// A resolved user's game library.
pub struct SteamLibrary {
    user: SteamUser,
    store: StoreClient,
}

impl SteamLibrary {
    /// Resolve `user_spec` (SteamID64, vanity name, or pasted profile URL)
    /// against the Web API.
    pub async fn connect(webapi: ApiClient, user_spec: &str) -> anyhow::Result<Self> {
        let user = resolve_user(webapi, user_spec)
            .await
            .with_context(|| format!("could not resolve Steam user {user_spec:?}"))?;
        Ok(Self {
            user,
            store: StoreClient::new().context("could not build storefront client")?,
        })
    }

    pub fn user(&self) -> &SteamUser {
        &self.user
    }

    /// Fetch the library as [`GameInfo`] records, alphabetical by name.
    ///
    /// When a resume cache is given, games already present in it are taken
    /// from there and every newly built record is persisted immediately, so
    /// an aborted run does not refetch what it already had.
    pub async fn fetch(
        &self,
        options: &FetchOptions,
        mut resume: Option<&mut ResumeCache>,
    ) -> anyhow::Result<Vec<GameInfo>> {
        let mut apps = self
            .user
            .owned_games(options.include_free)
            .await
            .context("could not fetch the owned-games list")?;
        apps.sort_by_key(|app| app.listed_name().unwrap_or_default().to_lowercase());

        info!("library holds {} games", apps.len());
        let mut games = Vec::new();
        for app in &apps {
            if let Some(limit) = options.limit {
                if games.len() >= limit {
                    debug!("stopping at the configured limit of {limit}");
                    break;
                }
            }
            if let Some(cached) = resume.as_deref().and_then(|r| r.get(app.appid())) {
                debug!("using cached info for {}", cached.name);
                games.push(cached.clone());
                continue;
            }
            if let Some(game) = self.build_game_info(app, options).await? {
                if let Some(resume) = resume.as_mut() {
                    resume
                        .insert(game.clone())
                        .context("could not persist the resume cache")?;
                }
                games.push(game);
            }
        }
        Ok(games)
    }

    /// Build one record, enriching from the storefront unless disabled.
    /// Returns `None` when the game is skipped by policy.
    async fn build_game_info(
        &self,
        app: &SteamApp,
        options: &FetchOptions,
    ) -> anyhow::Result<Option<GameInfo>> {
        let name = app
            .name()
            .await
            .context("could not resolve a game name")?;
        let mut game = GameInfo {
            id: app.appid(),
            name,
            genres: Vec::new(),
            release_date: None,
            playtime: format_playtime(app.playtime_forever()),
            playtime_minutes: app.playtime_forever(),
            icon_uri: app.img_icon_hash().map(|hash| media_url(app.appid(), hash)),
            logo_uri: app.img_logo_hash().map(|hash| media_url(app.appid(), hash)),
            background_uri: None,
            is_free: false,
        };

        if options.library_only {
            return Ok(Some(game));
        }

        match self.store.app_details(app.appid()).await {
            Ok(details) => {
                game.genres = details.genre_names();
                game.is_free = details.is_free;
                if !details.release_date.date.is_empty() {
                    game.release_date = Some(details.release_date.date.clone());
                }
                game.background_uri = details.background_image().map(str::to_owned);
                if game.logo_uri.is_none() && !details.header_image.is_empty() {
                    game.logo_uri = Some(details.header_image.clone());
                }
            }
            Err(steam_store::Error::AppNotFound { appid }) if options.skip_delisted => {
                info!("skipping {} ({appid}): not on the storefront", game.name);
                return Ok(None);
            }
            Err(steam_store::Error::AppNotFound { appid }) => {
                warn!(
                    "{} ({appid}) is not on the storefront, importing library data only",
                    game.name
                );
            }
            Err(e) => return Err(e).context("storefront lookup failed"),
        }
        // The owned-games call already excludes free titles when asked, but
        // some free licenses still show up as owned; the storefront flag
        // catches those.
        if !options.include_free && game.is_free {
            info!("skipping free game {}", game.name);
            return Ok(None);
        }
        Ok(Some(game))
    }
}

async fn resolve_user(webapi: ApiClient, user_spec: &str) -> anyhow::Result<SteamUser> {
    let mut spec = user_spec.trim();
    for prefix in PROFILE_URL_PREFIXES {
        if let Some(rest) = spec.strip_prefix(prefix) {
            spec = rest.trim_end_matches('/');
            break;
        }
    }
    if spec.is_empty() {
        bail!("empty Steam user");
    }
    if spec.chars().all(|c| c.is_ascii_digit()) {
        let steamid = spec.parse::<u64>().context("invalid SteamID64")?;
        return Ok(SteamUser::new(webapi, steamid));
    }
    Ok(SteamUser::from_vanity_url(webapi, spec).await?)
}

/// Human playtime string: "never played", whole minutes under two hours,
/// fractional hours beyond.
pub fn format_playtime(minutes: u64) -> String {
    match minutes {
        0 => "never played".to_string(),
        m if m < 120 => format!("{m} minutes"),
        m => format!("{:.1} hours", m as f64 / 60.0),
    }
}

/// Playtime in fractional hours, for the numeric database column.
pub fn playtime_hours(minutes: u64) -> f64 {
    (minutes as f64 / 60.0 * 10.0).round() / 10.0
}

fn media_url(appid: u64, hash: &str) -> String {
    format!("https://media.steampowered.com/steamcommunity/public/images/apps/{appid}/{hash}.jpg")
}

/// Sort games by descending playtime, ties alphabetical.
pub fn by_playtime(games: &mut [GameInfo]) {
    games.sort_by(|a, b| {
        b.playtime_minutes
            .cmp(&a.playtime_minutes)
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_playtime() {
        assert_eq!(format_playtime(0), "never played");
        assert_eq!(format_playtime(45), "45 minutes");
        assert_eq!(format_playtime(119), "119 minutes");
        assert_eq!(format_playtime(120), "2.0 hours");
        assert_eq!(format_playtime(6135), "102.2 hours");
    }

    #[test]
    fn test_playtime_hours_rounds_to_tenths() {
        assert_eq!(playtime_hours(0), 0.0);
        assert_eq!(playtime_hours(90), 1.5);
        assert_eq!(playtime_hours(6135), 102.3);
    }

    #[test]
    fn test_media_url() {
        assert_eq!(
            media_url(440, "abc123"),
            "https://media.steampowered.com/steamcommunity/public/images/apps/440/abc123.jpg"
        );
    }

    #[test]
    fn test_by_playtime_ordering() {
        let mut games = vec![
            game("Alpha", 10),
            game("Zulu", 500),
            game("Bravo", 500),
            game("Quiet", 0),
        ];
        by_playtime(&mut games);
        let names: Vec<&str> = games.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Bravo", "Zulu", "Alpha", "Quiet"]);
    }

    fn game(name: &str, minutes: u64) -> GameInfo {
        GameInfo {
            id: 1,
            name: name.to_string(),
            genres: Vec::new(),
            release_date: None,
            playtime: format_playtime(minutes),
            playtime_minutes: minutes,
            icon_uri: None,
            logo_uri: None,
            background_uri: None,
            is_free: false,
        }
    }
}
