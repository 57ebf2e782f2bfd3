//! In-memory weather cache with a fixed 15 minute time-to-live.
//!
//! Entries are evicted lazily: a read that finds a stale entry removes it.
//! The cache lives for the process only and is never written to disk.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::types::{LocationKey, WeatherBundle};

/// How long a fetched result stays fresh.
pub const CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// A cached lookup. Replaced wholesale on refresh, never edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub weather: WeatherBundle,
    pub fetched_at_millis: i64,
}

impl CacheEntry {
    pub fn new(weather: WeatherBundle, fetched_at_millis: i64) -> Self {
        Self {
            weather,
            fetched_at_millis,
        }
    }
}

pub struct WeatherCache {
    entries: Mutex<HashMap<LocationKey, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl WeatherCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Current time according to the cache's clock.
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Fresh entry for `key`, evicting it first if it has expired.
    pub fn get(&self, key: &LocationKey) -> Option<CacheEntry> {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock();

        let expired = match entries.get(key) {
            Some(entry) => now - entry.fetched_at_millis > CACHE_TTL.as_millis() as i64,
            None => return None,
        };

        if expired {
            tracing::debug!("Evicting stale weather for {}", key);
            entries.remove(key);
            return None;
        }

        entries.get(key).cloned()
    }

    pub fn put(&self, key: LocationKey, entry: CacheEntry) {
        self.entries.lock().insert(key, entry);
    }

    /// Store `weather` stamped with the current time.
    pub fn store(&self, key: LocationKey, weather: WeatherBundle) {
        let entry = CacheEntry::new(weather, self.clock.now_millis());
        self.put(key, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for WeatherCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherCache")
            .field("entries", &self.len())
            .finish()
    }
}
