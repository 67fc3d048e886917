//! Per-instance caching of fetched API documents
//!
//! Read-models memoize their backing documents (player summary, ban state,
//! badge list) so repeated accessor calls within a TTL window cost one
//! network round trip. Each instance owns its cache; nothing is shared
//! across objects. A TTL of [`INFINITE`] (zero) never expires and must be
//! invalidated explicitly.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::response::ApiResponse;

/// One minute, for TTL arithmetic.
pub const MINUTE: Duration = Duration::from_secs(60);

/// One hour, for TTL arithmetic.
pub const HOUR: Duration = Duration::from_secs(60 * 60);

/// Cache forever (until explicit invalidation).
pub const INFINITE: Duration = Duration::ZERO;

/// Property name → `(document, captured_at)` map for one object instance.
///
/// The guard is not for concurrent first-access races (callers are expected
/// to be sequential); it keeps the cache sound if instances ever cross
/// threads.
#[derive(Debug, Default)]
pub struct PropertyCache {
    entries: Mutex<HashMap<&'static str, (ApiResponse, Instant)>>,
}

impl PropertyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached document for `name` if it is still fresh.
    ///
    /// An entry is fresh when `ttl` is [`INFINITE`] or its age is within
    /// `ttl`. Stale entries are left in place; the next [`store`] call
    /// overwrites them.
    ///
    /// [`store`]: PropertyCache::store
    pub fn fresh(&self, name: &'static str, ttl: Duration) -> Option<ApiResponse> {
        let entries = self.entries.lock();
        let (value, captured_at) = entries.get(name)?;
        if ttl != INFINITE && captured_at.elapsed() > ttl {
            return None;
        }
        Some(value.clone())
    }

    /// Store a document under `name`, stamped now.
    pub fn store(&self, name: &'static str, value: ApiResponse) {
        self.entries.lock().insert(name, (value, Instant::now()));
    }

    /// Drop the entry for `name`, forcing a refetch on next access.
    pub fn invalidate(&self, name: &'static str) {
        self.entries.lock().remove(name);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Whether any entry (fresh or stale) exists for `name`.
    pub fn contains(&self, name: &'static str) -> bool {
        self.entries.lock().contains_key(name)
    }
}

/// Split `items` into consecutive chunks of at most `size` elements.
///
/// Order is preserved and the last chunk may be shorter. Used to respect
/// remote batch limits such as the 350-ID cap on `GetPlayerSummaries`.
pub fn chunked<T>(items: &[T], size: usize) -> impl Iterator<Item = &[T]> {
    debug_assert!(size > 0, "chunk size must be positive");
    items.chunks(size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;

    fn doc(n: u64) -> ApiResponse {
        ApiResponse::new(json!({ "n": n }))
    }

    #[test]
    fn test_infinite_ttl_never_expires() {
        let cache = PropertyCache::new();
        cache.store("summary", doc(1));
        sleep(Duration::from_millis(30));
        assert_eq!(cache.fresh("summary", INFINITE), Some(doc(1)));
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = PropertyCache::new();
        let ttl = Duration::from_millis(40);
        cache.store("summary", doc(1));

        // Within the window the entry is served.
        assert_eq!(cache.fresh("summary", ttl), Some(doc(1)));

        sleep(Duration::from_millis(60));
        assert_eq!(cache.fresh("summary", ttl), None);

        // A refreshed entry is fresh again.
        cache.store("summary", doc(2));
        assert_eq!(cache.fresh("summary", ttl), Some(doc(2)));
    }

    #[test]
    fn test_explicit_invalidation() {
        let cache = PropertyCache::new();
        cache.store("bans", doc(1));
        assert!(cache.contains("bans"));
        cache.invalidate("bans");
        assert!(!cache.contains("bans"));
        assert_eq!(cache.fresh("bans", INFINITE), None);
    }

    #[test]
    fn test_entries_are_independent() {
        let cache = PropertyCache::new();
        cache.store("summary", doc(1));
        cache.store("bans", doc(2));
        cache.invalidate("summary");
        assert_eq!(cache.fresh("bans", INFINITE), Some(doc(2)));
    }

    #[test]
    fn test_chunked_sizes_and_order() {
        let ids: Vec<u32> = (0..720).collect();
        let chunks: Vec<&[u32]> = chunked(&ids, 350).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 350);
        assert_eq!(chunks[1].len(), 350);
        assert_eq!(chunks[2].len(), 20);

        let rejoined: Vec<u32> = chunks.concat();
        assert_eq!(rejoined, ids);
    }

    #[test]
    fn test_chunked_short_input() {
        let ids = [1u32, 2, 3];
        let chunks: Vec<&[u32]> = chunked(&ids, 350).collect();
        assert_eq!(chunks, vec![&ids[..]]);
    }
}
