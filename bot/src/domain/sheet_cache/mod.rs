//! In-memory TTL cache fronting the tabular store's read API.
//!
//! Entries are keyed by the composite `sourceId:range` key or by an explicit
//! key supplied by the caller. Aliases registered at startup resolve to the
//! composite key of one address, so every alias of an address shares one
//! entry and one fetch. A failed refetch keeps serving the previous rows; only
//! an entry that has never been fetched surfaces the read error.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::ports::{CacheKey, SheetAddress, SheetReadError, SheetReader, SheetRows};

mod refresh;

pub use refresh::PeriodicRefresh;

/// Default freshness window.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Cache tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetCacheConfig {
    /// Entries younger than this are served without refetching.
    pub ttl: Duration,
}

impl Default for SheetCacheConfig {
    fn default() -> Self {
        Self { ttl: DEFAULT_TTL }
    }
}

/// Errors returned by [`SheetCache`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetCacheError {
    /// The first fetch of an entry failed, so there is nothing to serve.
    #[error(transparent)]
    Fetch(#[from] SheetReadError),
    /// No alias with this name was registered.
    #[error("no sheet alias named {alias}")]
    UnknownAlias {
        /// The alias looked up.
        alias: String,
    },
    /// The alias is already bound to a different address.
    #[error("sheet alias {alias} is already bound to {bound}")]
    AliasConflict {
        /// The alias being registered.
        alias: String,
        /// Address it is already bound to.
        bound: String,
    },
}

#[derive(Debug)]
struct CacheEntry {
    address: SheetAddress,
    rows: Option<Arc<SheetRows>>,
    fetched_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    fn empty(address: SheetAddress) -> Self {
        Self {
            address,
            rows: None,
            fetched_at: None,
        }
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    aliases: HashMap<CacheKey, SheetAddress>,
    /// Bumped by `clear(None)`.
    epoch: u64,
    /// Bumped per key by `clear(Some(key))`; survives entry removal.
    generations: HashMap<CacheKey, u64>,
}

/// Clear count observed when a fetch started.
type Generation = (u64, u64);

impl CacheState {
    fn generation(&self, key: &CacheKey) -> Generation {
        (self.epoch, self.generations.get(key).copied().unwrap_or(0))
    }
}

/// Freshness snapshot for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntryStats {
    /// Key the entry is stored under.
    pub key: String,
    /// Aliases resolving to this entry.
    pub aliases: Vec<String>,
    /// Number of cached rows (0 before the first fetch).
    pub rows: usize,
    /// Time since the last successful fetch.
    pub age: Option<Duration>,
    /// Whether the entry would be served without refetching.
    pub fresh: bool,
}

/// Whole-cache snapshot for observability.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Number of entries, fetched or not.
    pub entry_count: usize,
    /// Rows across all entries.
    pub total_rows: usize,
    /// Per-entry detail, ordered by key.
    pub entries: Vec<CacheEntryStats>,
}

/// Outcome of one refresh sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshReport {
    /// Entries refetched successfully.
    pub refreshed: usize,
    /// Entries whose refetch failed; their previous rows stay cached.
    pub failed: usize,
}

/// TTL cache over sheet ranges.
pub struct SheetCache {
    reader: Arc<dyn SheetReader>,
    clock: Arc<dyn Clock>,
    config: SheetCacheConfig,
    state: Mutex<CacheState>,
}

impl SheetCache {
    /// Open an empty cache. Share it behind an [`Arc`] so the periodic
    /// refresh task can hold it.
    /// ```rust,ignore
    /// let cache = SheetCache::open(reader, clock, SheetCacheConfig::default());
    /// ```
    pub fn open(
        reader: Arc<dyn SheetReader>,
        clock: Arc<dyn Clock>,
        config: SheetCacheConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            reader,
            clock,
            config,
            state: Mutex::new(CacheState::default()),
        })
    }

    /// Bind each alias to `address`, creating an unfetched entry if needed.
    ///
    /// Re-registering an alias for the same address is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SheetCacheError::AliasConflict`] when an alias is already
    /// bound to another address; earlier aliases in the slice stay bound.
    pub fn register_alias(
        &self,
        address: &SheetAddress,
        aliases: &[CacheKey],
    ) -> Result<(), SheetCacheError> {
        let mut state = self.lock_state();
        for alias in aliases {
            match state.aliases.get(alias) {
                Some(bound) if bound == address => {}
                Some(bound) => {
                    return Err(SheetCacheError::AliasConflict {
                        alias: alias.to_string(),
                        bound: bound.to_string(),
                    });
                }
                None => {
                    state.aliases.insert(alias.clone(), address.clone());
                }
            }
        }
        state
            .entries
            .entry(address.cache_key())
            .or_insert_with(|| CacheEntry::empty(address.clone()));
        Ok(())
    }

    /// Address an alias is bound to.
    pub fn alias_address(&self, alias: &CacheKey) -> Option<SheetAddress> {
        self.lock_state().aliases.get(alias).cloned()
    }

    /// Rows for `address`, fetched when forced, never fetched, or stale.
    ///
    /// `key` takes priority over the composite key of `address`; when it is a
    /// registered alias the alias's address is read instead.
    ///
    /// # Errors
    ///
    /// Returns [`SheetCacheError::Fetch`] only when the fetch failed and the
    /// entry holds no earlier rows.
    pub async fn get(
        &self,
        address: &SheetAddress,
        key: Option<&CacheKey>,
        force_refresh: bool,
    ) -> Result<Arc<SheetRows>, SheetCacheError> {
        let (key, address) = self.resolve(address, key);
        let now = self.clock.utc();

        let cached = {
            let mut state = self.lock_state();
            let entry = state
                .entries
                .entry(key.clone())
                .or_insert_with(|| CacheEntry::empty(address.clone()));
            match &entry.rows {
                Some(rows) if !force_refresh && self.is_fresh(entry.fetched_at, now) => {
                    Some(Arc::clone(rows))
                }
                _ => None,
            }
        };
        if let Some(rows) = cached {
            return Ok(rows);
        }

        match self.refetch(&key, &address).await {
            Ok(rows) => Ok(rows),
            Err(error) => {
                let stale = self
                    .lock_state()
                    .entries
                    .get(&key)
                    .and_then(|entry| entry.rows.clone());
                match stale {
                    Some(rows) => {
                        warn!(key = %key, error = %error, "sheet refetch failed; serving stale rows");
                        Ok(rows)
                    }
                    None => Err(SheetCacheError::Fetch(error)),
                }
            }
        }
    }

    /// Rows behind a registered alias.
    ///
    /// # Errors
    ///
    /// Returns [`SheetCacheError::UnknownAlias`] for unregistered aliases and
    /// otherwise behaves like [`SheetCache::get`].
    pub async fn get_alias(
        &self,
        alias: &CacheKey,
        force_refresh: bool,
    ) -> Result<Arc<SheetRows>, SheetCacheError> {
        let address = self
            .alias_address(alias)
            .ok_or_else(|| SheetCacheError::UnknownAlias {
                alias: alias.to_string(),
            })?;
        self.get(&address, Some(alias), force_refresh).await
    }

    /// Drop one entry (aliases survive and see a fresh empty entry next time)
    /// or, with `None`, every entry. Returns the number of entries removed.
    ///
    /// Fetches already in flight for a cleared entry still answer their
    /// caller but do not repopulate the cache.
    pub fn clear(&self, key: Option<&CacheKey>) -> usize {
        let mut state = self.lock_state();
        match key {
            None => {
                let removed = state.entries.len();
                state.entries.clear();
                state.epoch += 1;
                removed
            }
            Some(key) => {
                let target = state
                    .aliases
                    .get(key)
                    .map_or_else(|| key.clone(), SheetAddress::cache_key);
                let removed = state.entries.remove(&target).is_some();
                *state.generations.entry(target).or_default() += 1;
                usize::from(removed)
            }
        }
    }

    /// Entry count, row totals, and per-entry freshness.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.utc();
        let state = self.lock_state();

        let mut aliases_by_key: BTreeMap<CacheKey, Vec<String>> = BTreeMap::new();
        for (alias, address) in &state.aliases {
            aliases_by_key
                .entry(address.cache_key())
                .or_default()
                .push(alias.to_string());
        }

        let mut entries: Vec<CacheEntryStats> = state
            .entries
            .iter()
            .map(|(key, entry)| {
                let mut aliases = aliases_by_key.get(key).cloned().unwrap_or_default();
                aliases.sort_unstable();
                CacheEntryStats {
                    key: key.to_string(),
                    aliases,
                    rows: entry.rows.as_ref().map_or(0, |rows| rows.len()),
                    age: entry
                        .fetched_at
                        .and_then(|fetched| now.signed_duration_since(fetched).to_std().ok()),
                    fresh: entry.rows.is_some() && self.is_fresh(entry.fetched_at, now),
                }
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        CacheStats {
            entry_count: entries.len(),
            total_rows: entries.iter().map(|entry| entry.rows).sum(),
            entries,
        }
    }

    /// Force-refresh every known address once, including aliases whose entry
    /// was cleared. Failures are counted, never propagated.
    pub async fn refresh_all(&self) -> RefreshReport {
        let targets: BTreeMap<CacheKey, SheetAddress> = {
            let state = self.lock_state();
            let mut targets: BTreeMap<CacheKey, SheetAddress> = state
                .entries
                .iter()
                .map(|(key, entry)| (key.clone(), entry.address.clone()))
                .collect();
            let bound: BTreeSet<&SheetAddress> = state.aliases.values().collect();
            for address in bound {
                targets
                    .entry(address.cache_key())
                    .or_insert_with(|| address.clone());
            }
            targets
        };

        let mut report = RefreshReport::default();
        for (key, address) in targets {
            match self.refetch(&key, &address).await {
                Ok(_) => report.refreshed += 1,
                Err(error) => {
                    warn!(key = %key, error = %error, "periodic sheet refresh failed");
                    report.failed += 1;
                }
            }
        }
        report
    }

    async fn refetch(
        &self,
        key: &CacheKey,
        address: &SheetAddress,
    ) -> Result<Arc<SheetRows>, SheetReadError> {
        debug!(key = %key, address = %address, "fetching sheet range");
        let started = self.lock_state().generation(key);
        let rows = Arc::new(self.reader.read_range(address).await?);
        let fetched_at = self.clock.utc();

        let mut state = self.lock_state();
        if state.generation(key) != started {
            debug!(key = %key, "entry cleared during fetch; rows not cached");
            return Ok(rows);
        }
        let entry = state
            .entries
            .entry(key.clone())
            .or_insert_with(|| CacheEntry::empty(address.clone()));
        entry.rows = Some(Arc::clone(&rows));
        entry.fetched_at = Some(fetched_at);
        Ok(rows)
    }

    fn resolve(&self, address: &SheetAddress, key: Option<&CacheKey>) -> (CacheKey, SheetAddress) {
        match key {
            Some(key) => match self.lock_state().aliases.get(key) {
                Some(bound) => (bound.cache_key(), bound.clone()),
                None => (key.clone(), address.clone()),
            },
            None => (address.cache_key(), address.clone()),
        }
    }

    fn is_fresh(&self, fetched_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(fetched_at) = fetched_at else {
            return false;
        };
        let ttl = TimeDelta::from_std(self.config.ttl).unwrap_or(TimeDelta::MAX);
        now.signed_duration_since(fetched_at) < ttl
    }

    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        // State holds plain data; a panic mid-update leaves it usable.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
