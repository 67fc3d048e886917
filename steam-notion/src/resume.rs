//! Resume cache for interrupted syncs
//!
//! Fetching a large library takes hundreds of storefront requests, and a
//! rate limit can abort the run halfway. Every fetched record is written to
//! a flat JSON file keyed by appid; the next run reuses those records
//! instead of refetching. After a fully successful import the file is
//! deleted so a later run starts from live data.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::library::GameInfo;

/// Default cache file name, in the working directory.
pub const DEFAULT_CACHE_FILE: &str = "game_info_cache.json";

/// Appid-keyed store of fetched game records, persisted after each insert.
#[derive(Debug)]
pub struct ResumeCache {
    path: PathBuf,
    entries: BTreeMap<u64, GameInfo>,
}

impl ResumeCache {
    /// Open the cache at `path`, loading any previous run's entries. A
    /// corrupt file is renamed aside and treated as empty rather than
    /// blocking the sync.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("could not read {}", path.display()))?;
            match serde_json::from_str::<BTreeMap<u64, GameInfo>>(&text) {
                Ok(entries) => {
                    info!(
                        "resuming with {} cached games from {}",
                        entries.len(),
                        path.display()
                    );
                    entries
                }
                Err(e) => {
                    let aside = path.with_extension("json.corrupt");
                    warn!(
                        "cache file {} is corrupt ({e}), moving it to {}",
                        path.display(),
                        aside.display()
                    );
                    fs::rename(&path, &aside)
                        .with_context(|| format!("could not move {} aside", path.display()))?;
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, appid: u64) -> bool {
        self.entries.contains_key(&appid)
    }

    pub fn get(&self, appid: u64) -> Option<&GameInfo> {
        self.entries.get(&appid)
    }

    /// Add a record and persist the whole cache.
    pub fn insert(&mut self, game: GameInfo) -> anyhow::Result<()> {
        self.entries.insert(game.id, game);
        self.persist()
    }

    /// Delete the cache file after a fully successful import.
    pub fn discard(self) -> anyhow::Result<()> {
        if self.path.exists() {
            debug!("removing resume cache {}", self.path.display());
            fs::remove_file(&self.path)
                .with_context(|| format!("could not remove {}", self.path.display()))?;
        }
        Ok(())
    }

    fn persist(&self) -> anyhow::Result<()> {
        let text = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, text)
            .with_context(|| format!("could not write {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::format_playtime;

    fn game(id: u64, name: &str) -> GameInfo {
        GameInfo {
            id,
            name: name.to_string(),
            genres: vec!["Action".to_string()],
            release_date: Some("8 Nov, 1998".to_string()),
            playtime: format_playtime(90),
            playtime_minutes: 90,
            icon_uri: None,
            logo_uri: None,
            background_uri: None,
            is_free: false,
        }
    }

    #[test]
    fn test_round_trip_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cache.json");

        let mut cache = ResumeCache::open(&path).expect("open");
        assert!(cache.is_empty());
        cache.insert(game(70, "Half-Life")).expect("insert");
        cache.insert(game(440, "Team Fortress 2")).expect("insert");

        let reopened = ResumeCache::open(&path).expect("reopen");
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.get(70).map(|g| g.name.as_str()), Some("Half-Life"));
        assert!(reopened.contains(440));
        assert!(!reopened.contains(730));
    }

    #[test]
    fn test_discard_removes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cache.json");

        let mut cache = ResumeCache::open(&path).expect("open");
        cache.insert(game(70, "Half-Life")).expect("insert");
        assert!(path.exists());

        cache.discard().expect("discard");
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_file_is_moved_aside() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cache.json");
        fs::write(&path, "{not json").expect("write");

        let cache = ResumeCache::open(&path).expect("open");
        assert!(cache.is_empty());
        assert!(path.with_extension("json.corrupt").exists());
    }
}
