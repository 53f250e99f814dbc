pub mod rocks;
pub mod store;

pub use rocks::RocksStore;
pub use store::{CacheStore, MemoryStore};

use crate::error::{Error, FetchError};
use crate::model::BreachRecord;
use chrono::{DateTime, TimeZone, Utc};
use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// A source's stored payload and when it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPayload {
    pub records: Vec<BreachRecord>,
    pub fetched_at: DateTime<Utc>,
    /// Description of where the payload came from, if the caller supplied one.
    pub origin: Option<String>,
}

fn payload_key(source_id: &str) -> String {
    format!("{}:payload", source_id)
}

fn timestamp_key(source_id: &str) -> String {
    format!("{}:fetched_at", source_id)
}

fn origin_key(source_id: &str) -> String {
    format!("{}:origin", source_id)
}

/// Time-boxed cache in front of the source adapters.
///
/// A failed refresh never evicts what is stored, and a failed write never hides
/// freshly fetched data from the caller. Read-then-write is serialized per source
/// id, so concurrent callers for one source trigger a single fetch.
pub struct FreshnessCache {
    store: Box<dyn CacheStore>,
    clock: Box<dyn Clock>,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
}

impl FreshnessCache {
    pub fn new(store: impl CacheStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            clock: Box::new(SystemClock),
            in_flight: DashMap::new(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn store(&self) -> &dyn CacheStore {
        self.store.as_ref()
    }

    /// Return the stored records for `source_id` if younger than `ttl`, otherwise
    /// call `fetch_fn` and store its result.
    pub fn get_or_fetch<F>(
        &self,
        source_id: &str,
        fetch_fn: F,
        ttl: Duration,
    ) -> Result<Vec<BreachRecord>, FetchError>
    where
        F: FnOnce() -> Result<Vec<BreachRecord>, FetchError>,
    {
        self.get_or_fetch_from(source_id, None, fetch_fn, ttl)
    }

    /// Like [`get_or_fetch`](Self::get_or_fetch), but a stored entry whose origin
    /// differs from `origin` is a miss regardless of age.
    pub fn get_or_fetch_from<F>(
        &self,
        source_id: &str,
        origin: Option<&str>,
        fetch_fn: F,
        ttl: Duration,
    ) -> Result<Vec<BreachRecord>, FetchError>
    where
        F: FnOnce() -> Result<Vec<BreachRecord>, FetchError>,
    {
        let gate = self
            .in_flight
            .entry(source_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _held = gate.lock().unwrap_or_else(PoisonError::into_inner);

        let now = self.clock.now();
        let cached = self.stored(source_id).filter(|cached| {
            let matches = origin.is_none() || cached.origin.as_deref() == origin;
            if !matches {
                debug!("Cache entry for '{}' came from a different origin", source_id);
            }
            matches
        });
        if let Some(cached) = cached {
            let age_ms = now.timestamp_millis() - cached.fetched_at.timestamp_millis();
            let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
            if age_ms < ttl_ms {
                debug!(
                    "Cache hit for '{}' ({} records, age {}s)",
                    source_id,
                    cached.records.len(),
                    age_ms / 1000
                );
                return Ok(cached.records);
            }
            debug!("Cache entry for '{}' expired ({}s old)", source_id, age_ms / 1000);
        }

        info!("Refreshing source '{}'", source_id);
        let records = fetch_fn()?;

        if let Err(e) = self.write(source_id, &records, self.clock.now(), origin) {
            warn!("Failed to write cache for '{}': {}", source_id, e);
        }
        Ok(records)
    }

    /// The stored entry for `source_id`. Unreadable entries count as absent.
    pub fn stored(&self, source_id: &str) -> Option<CachedPayload> {
        match self.read(source_id) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ignoring unreadable cache entry for '{}': {}", source_id, e);
                None
            }
        }
    }

    fn read(&self, source_id: &str) -> Result<Option<CachedPayload>, Error> {
        let timestamp = match self.store.get(&timestamp_key(source_id))? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };
        let payload = match self.store.get(&payload_key(source_id))? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };

        let millis: i64 = String::from_utf8_lossy(&timestamp)
            .trim()
            .parse()
            .map_err(|e| Error::Cache(format!("bad timestamp: {}", e)))?;
        let fetched_at = Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| Error::Cache(format!("timestamp {} out of range", millis)))?;
        let records: Vec<BreachRecord> = serde_json::from_slice(&payload)?;
        let origin = self
            .store
            .get(&origin_key(source_id))?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());

        Ok(Some(CachedPayload {
            records,
            fetched_at,
            origin,
        }))
    }

    fn write(
        &self,
        source_id: &str,
        records: &[BreachRecord],
        fetched_at: DateTime<Utc>,
        origin: Option<&str>,
    ) -> Result<(), Error> {
        let payload = serde_json::to_vec(records)?;
        self.store.put(&payload_key(source_id), &payload)?;
        if let Some(origin) = origin {
            self.store.put(&origin_key(source_id), origin.as_bytes())?;
        }
        self.store.put(
            &timestamp_key(source_id),
            fetched_at.timestamp_millis().to_string().as_bytes(),
        )?;
        debug!(
            "Cached {} records for '{}' ({} bytes)",
            records.len(),
            source_id,
            payload.len()
        );
        Ok(())
    }
}
