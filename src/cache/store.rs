use crate::error::Error;
use dashmap::DashMap;
use std::sync::Arc;

/// Key/value storage behind the freshness cache.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error>;
    fn put(&self, key: &str, value: &[u8]) -> Result<(), Error>;
    fn count_keys(&self) -> Result<usize, Error>;
    fn clear_all(&self) -> Result<(), Error>;
}

impl<S: CacheStore + ?Sized> CacheStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), Error> {
        (**self).put(key, value)
    }

    fn count_keys(&self) -> Result<usize, Error> {
        (**self).count_keys()
    }

    fn clear_all(&self) -> Result<(), Error> {
        (**self).clear_all()
    }
}

/// Process-local store, used when no cache path is configured and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), Error> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn count_keys(&self) -> Result<usize, Error> {
        Ok(self.entries.len())
    }

    fn clear_all(&self) -> Result<(), Error> {
        self.entries.clear();
        Ok(())
    }
}
