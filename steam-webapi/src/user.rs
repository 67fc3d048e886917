//! Steam user read-model
//!
//! A [`SteamUser`] is a lightweight handle on a 64-bit Steam ID plus a
//! per-instance [`PropertyCache`]. Accessors lazily fetch the backing API
//! documents (profile summary, ban state, badge list) and memoize them with
//! per-document TTLs, so `user.persona_name()` twice in a row costs one
//! round trip.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::app::SteamApp;
use crate::cache::{INFINITE, PropertyCache, chunked};
use crate::client::{ApiClient, ApiParams};
use crate::error::{Error, Result};
use crate::response::ApiResponse;

/// Offset between a 32-bit account ID and the 64-bit Steam ID of an
/// individual account in the public universe.
pub const ACCOUNT_ID_OFFSET: u64 = 76_561_197_960_265_728;

/// `GetPlayerSummaries` accepts at most this many IDs per request.
pub const SUMMARY_BATCH_LIMIT: usize = 350;

const SUMMARY_TTL: std::time::Duration = std::time::Duration::from_secs(2 * 60 * 60);
const BADGES_TTL: std::time::Duration = std::time::Duration::from_secs(30 * 60);

const SUMMARY: &str = "summary";
const BANS: &str = "bans";
const BADGES: &str = "badges";

/// A user profile bound to one 64-bit Steam ID.
#[derive(Debug)]
pub struct SteamUser {
    client: ApiClient,
    steamid: u64,
    friend_since: Option<DateTime<Utc>>,
    cache: PropertyCache,
}

/// One badge on a user's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SteamUserBadge {
    pub badge_id: u64,
    pub level: u64,
    pub xp: u64,
    pub scarcity: u64,
    pub completion_time: Option<DateTime<Utc>>,
    pub appid: Option<u64>,
}

/// A community group a user belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SteamGroup {
    pub gid: u64,
}

impl SteamUser {
    /// Bind to a 64-bit Steam ID without any network traffic.
    pub fn new(client: ApiClient, steamid: u64) -> Self {
        Self {
            client,
            steamid,
            friend_since: None,
            cache: PropertyCache::new(),
        }
    }

    /// Bind to a 32-bit account ID (the short form shown in some places).
    pub fn from_account_id(client: ApiClient, account_id: u32) -> Self {
        Self::new(client, u64::from(account_id) + ACCOUNT_ID_OFFSET)
    }

    /// Resolve a vanity URL name (`steamcommunity.com/id/<name>`) to a user.
    ///
    /// The name is the final path component only; full URLs are rejected so
    /// a pasted profile link fails loudly instead of resolving to nothing.
    pub async fn from_vanity_url(client: ApiClient, vanity_name: &str) -> Result<Self> {
        if vanity_name.is_empty() || vanity_name.contains('/') {
            return Err(Error::invalid_argument(format!(
                "vanity name must be a bare profile name, got {vanity_name:?}"
            )));
        }
        let response = client
            .call(
                "ISteamUser",
                "ResolveVanityURL",
                "v0001",
                ApiParams::new().push("vanityurl", vanity_name),
            )
            .await?;
        if response.unsigned_of("success")? != 1 {
            return Err(Error::UserNotFound(vanity_name.to_string()));
        }
        let steamid = response
            .string_of("steamid")?
            .parse::<u64>()
            .map_err(|_| Error::wrong_type("steamid", "unsigned integer"))?;
        Ok(Self::new(client, steamid))
    }

    /// The 64-bit Steam ID.
    pub fn steamid(&self) -> u64 {
        self.steamid
    }

    /// The 32-bit account ID.
    pub fn account_id(&self) -> u32 {
        // Truncation is exact for individual accounts.
        (self.steamid - ACCOUNT_ID_OFFSET) as u32
    }

    /// When this user friended the viewer. Only set on users produced by
    /// [`SteamUser::friends`].
    pub fn friend_since(&self) -> Option<DateTime<Utc>> {
        self.friend_since
    }

    /// Drop all cached documents, forcing fresh fetches.
    pub fn refresh(&self) {
        self.cache.clear();
    }

    /// The profile summary document (`GetPlayerSummaries`), cached for two
    /// hours.
    pub async fn summary(&self) -> Result<ApiResponse> {
        if let Some(doc) = self.cache.fresh(SUMMARY, SUMMARY_TTL) {
            return Ok(doc);
        }
        let response = self
            .client
            .call(
                "ISteamUser",
                "GetPlayerSummaries",
                "v0002",
                ApiParams::new().push("steamids", self.steamid),
            )
            .await?;
        let doc = response
            .field("players")?
            .index(0)
            .map_err(|_| Error::UserNotFound(self.steamid.to_string()))?;
        self.cache.store(SUMMARY, doc.clone());
        Ok(doc)
    }

    /// The ban-state document (`GetPlayerBans`). Cached until explicitly
    /// refreshed; ban state changes rarely enough that callers who care
    /// call [`refresh`](SteamUser::refresh).
    pub async fn bans(&self) -> Result<ApiResponse> {
        if let Some(doc) = self.cache.fresh(BANS, INFINITE) {
            return Ok(doc);
        }
        let response = self
            .client
            .call(
                "ISteamUser",
                "GetPlayerBans",
                "v1",
                ApiParams::new().push("steamids", self.steamid),
            )
            .await?;
        let doc = response
            .field("players")?
            .index(0)
            .map_err(|_| Error::UserNotFound(self.steamid.to_string()))?;
        self.cache.store(BANS, doc.clone());
        Ok(doc)
    }

    /// The badge document (`IPlayerService/GetBadges`), cached for thirty
    /// minutes.
    async fn badges_doc(&self) -> Result<ApiResponse> {
        if let Some(doc) = self.cache.fresh(BADGES, BADGES_TTL) {
            return Ok(doc);
        }
        let doc = self
            .client
            .call(
                "IPlayerService",
                "GetBadges",
                "v1",
                ApiParams::new().push("steamid", self.steamid),
            )
            .await?;
        self.cache.store(BADGES, doc.clone());
        Ok(doc)
    }

    /// Display name.
    pub async fn persona_name(&self) -> Result<String> {
        self.summary().await?.string_of("personaname")
    }

    /// Real name, if the profile publishes one.
    pub async fn real_name(&self) -> Result<Option<String>> {
        Ok(self
            .summary()
            .await?
            .get("realname")
            .and_then(|v| v.as_str().map(str::to_owned)))
    }

    /// Two-letter country code, if published.
    pub async fn country_code(&self) -> Result<Option<String>> {
        Ok(self
            .summary()
            .await?
            .get("loccountrycode")
            .and_then(|v| v.as_str().map(str::to_owned)))
    }

    /// Community profile URL.
    pub async fn profile_url(&self) -> Result<String> {
        self.summary().await?.string_of("profileurl")
    }

    /// Small (32x32) avatar URL.
    pub async fn avatar(&self) -> Result<String> {
        self.summary().await?.string_of("avatar")
    }

    /// Medium (64x64) avatar URL.
    pub async fn avatar_medium(&self) -> Result<String> {
        self.summary().await?.string_of("avatarmedium")
    }

    /// Full (184x184) avatar URL.
    pub async fn avatar_full(&self) -> Result<String> {
        self.summary().await?.string_of("avatarfull")
    }

    /// Online status code (0 offline .. 6 looking to play).
    pub async fn persona_state(&self) -> Result<u64> {
        self.summary().await?.unsigned_of("personastate")
    }

    /// Profile visibility code (1 private, 3 public).
    pub async fn visibility(&self) -> Result<u64> {
        self.summary().await?.unsigned_of("communityvisibilitystate")
    }

    /// Last logoff time, if published.
    pub async fn last_logoff(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .summary()
            .await?
            .get("lastlogoff")
            .and_then(|v| v.as_i64())
            .and_then(timestamp))
    }

    /// Account creation time, if published.
    pub async fn time_created(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .summary()
            .await?
            .get("timecreated")
            .and_then(|v| v.as_i64())
            .and_then(timestamp))
    }

    /// Primary group ID, if set.
    pub async fn primary_group(&self) -> Result<Option<u64>> {
        Ok(self
            .summary()
            .await?
            .get("primaryclanid")
            .and_then(|v| v.as_str().and_then(|s| s.parse().ok())))
    }

    /// Steam community level.
    pub async fn level(&self) -> Result<u64> {
        self.badges_doc().await?.unsigned_of("player_level")
    }

    /// Community XP.
    pub async fn xp(&self) -> Result<u64> {
        self.badges_doc().await?.unsigned_of("player_xp")
    }

    /// Profile badges.
    pub async fn badges(&self) -> Result<Vec<SteamUserBadge>> {
        let doc = self.badges_doc().await?;
        let mut badges = Vec::new();
        for entry in doc.field("badges")?.elements() {
            badges.push(SteamUserBadge {
                badge_id: entry.unsigned_of("badgeid")?,
                level: entry.unsigned_of("level")?,
                xp: entry.unsigned_of("xp")?,
                scarcity: entry.unsigned_of("scarcity")?,
                completion_time: entry
                    .get("completion_time")
                    .and_then(|v| v.as_i64())
                    .and_then(timestamp),
                appid: entry.get("appid").and_then(|v| v.as_u64()),
            });
        }
        Ok(badges)
    }

    /// Community groups this user belongs to.
    pub async fn groups(&self) -> Result<Vec<SteamGroup>> {
        let response = self
            .client
            .call(
                "ISteamUser",
                "GetUserGroupList",
                "v1",
                ApiParams::new().push("steamid", self.steamid),
            )
            .await?;
        if !response.get("success").map(|v| v.boolean()).transpose()?.unwrap_or(true) {
            return Err(Error::PrivateProfile);
        }
        let mut groups = Vec::new();
        for entry in response.field("groups")?.elements() {
            let gid = entry
                .string_of("gid")?
                .parse::<u64>()
                .map_err(|_| Error::wrong_type("gid", "unsigned integer"))?;
            groups.push(SteamGroup { gid });
        }
        Ok(groups)
    }

    /// The friend list, with every friend's profile summary pre-fetched.
    ///
    /// Summaries are fetched in batches of [`SUMMARY_BATCH_LIMIT`] IDs, so a
    /// list of 720 friends costs three summary calls instead of 720. Friends
    /// whose summary is missing from the batch response are still returned;
    /// their accessors fetch individually on demand.
    pub async fn friends(&self) -> Result<Vec<SteamUser>> {
        let response = self
            .client
            .call(
                "ISteamUser",
                "GetFriendList",
                "v1",
                ApiParams::new()
                    .push("steamid", self.steamid)
                    .push("relationship", "friend"),
            )
            .await?;
        let list = response.field("friendslist")?.field("friends")?;

        let mut friends = Vec::new();
        for entry in list.elements() {
            let steamid = entry
                .string_of("steamid")?
                .parse::<u64>()
                .map_err(|_| Error::wrong_type("steamid", "unsigned integer"))?;
            let mut friend = SteamUser::new(self.client.clone(), steamid);
            friend.friend_since = entry
                .get("friend_since")
                .and_then(|v| v.as_i64())
                .and_then(timestamp);
            friends.push(friend);
        }

        self.precache_summaries(&friends).await?;
        Ok(friends)
    }

    /// Fetch summaries for `users` in batches and seed each user's cache.
    async fn precache_summaries(&self, users: &[SteamUser]) -> Result<()> {
        let ids: Vec<u64> = users.iter().map(SteamUser::steamid).collect();
        for batch in chunked(&ids, SUMMARY_BATCH_LIMIT) {
            let steamids: Vec<String> = batch.iter().map(u64::to_string).collect();
            debug!("pre-fetching {} profile summaries", steamids.len());
            let response = self
                .client
                .call(
                    "ISteamUser",
                    "GetPlayerSummaries",
                    "v0002",
                    ApiParams::new().push("steamids", steamids),
                )
                .await?;
            for player in response.field("players")?.elements() {
                let Ok(steamid) = player.string_of("steamid")?.parse::<u64>() else {
                    warn!("summary entry with unparseable steamid, skipping");
                    continue;
                };
                if let Some(user) = users.iter().find(|u| u.steamid == steamid) {
                    user.cache.store(SUMMARY, player.clone());
                }
            }
        }
        Ok(())
    }

    /// Games played in the last two weeks.
    pub async fn recently_played(&self) -> Result<Vec<SteamApp>> {
        let response = self
            .client
            .call(
                "IPlayerService",
                "GetRecentlyPlayedGames",
                "v1",
                ApiParams::new().push("steamid", self.steamid),
            )
            .await?;
        // A private profile yields an empty object with no total_count.
        if !response.contains("total_count") {
            return Err(Error::PrivateProfile);
        }
        let mut apps = Vec::new();
        if let Some(games) = response.get("games") {
            for entry in games.elements() {
                apps.push(SteamApp::from_owned_entry(
                    self.client.clone(),
                    &entry,
                    self.steamid,
                )?);
            }
        }
        Ok(apps)
    }

    /// The owned-games library, excluding free titles.
    pub async fn games(&self) -> Result<Vec<SteamApp>> {
        self.owned_games(false).await
    }

    /// The owned-games library. When `include_free` is set, free games with
    /// recorded playtime are included.
    pub async fn owned_games(&self, include_free: bool) -> Result<Vec<SteamApp>> {
        let response = self
            .client
            .call(
                "IPlayerService",
                "GetOwnedGames",
                "v1",
                ApiParams::new()
                    .push("steamid", self.steamid)
                    .push("include_appinfo", true)
                    .push("include_played_free_games", include_free),
            )
            .await?;
        // Private game details come back as an empty object.
        if !response.contains("game_count") {
            return Err(Error::PrivateProfile);
        }
        let mut apps = Vec::new();
        if let Some(games) = response.get("games") {
            for entry in games.elements() {
                apps.push(SteamApp::from_owned_entry(
                    self.client.clone(),
                    &entry,
                    self.steamid,
                )?);
            }
        }
        Ok(apps)
    }
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("https://api.example.com").expect("client")
    }

    #[test]
    fn test_account_id_round_trip() {
        let user = SteamUser::from_account_id(client(), 117_100_618);
        assert_eq!(user.steamid(), 76_561_197_960_265_728 + 117_100_618);
        assert_eq!(user.account_id(), 117_100_618);
    }

    #[test]
    fn test_new_user_performs_no_io() {
        let user = SteamUser::new(client(), 76_561_198_077_366_346);
        assert_eq!(user.steamid(), 76_561_198_077_366_346);
        assert_eq!(user.friend_since(), None);
    }

    #[tokio::test]
    async fn test_vanity_name_with_slash_rejected() {
        let result = SteamUser::from_vanity_url(client(), "id/gabelogannewell").await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        let result = SteamUser::from_vanity_url(client(), "").await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_timestamp_conversion() {
        let ts = timestamp(1_262_304_000).expect("valid timestamp");
        assert_eq!(ts.to_rfc3339(), "2010-01-01T00:00:00+00:00");
    }
}
