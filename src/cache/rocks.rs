use super::store::CacheStore;
use crate::error::Error;
use rocksdb::{IteratorMode, Options, WriteBatch, DB};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Persistent cache store backed by RocksDB.
pub struct RocksStore {
    db: DB,
}

impl RocksStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("Using '{}' for source cache", path.display());
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut db_options = Options::default();
        db_options.create_if_missing(true);
        let db = DB::open(&db_options, path)?;
        Ok(Self { db })
    }
}

impl CacheStore for RocksStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.db.get(key.as_bytes())?)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), Error> {
        self.db.put(key.as_bytes(), value)?;
        Ok(())
    }

    fn count_keys(&self) -> Result<usize, Error> {
        let mut count = 0usize;
        for item in self.db.iterator(IteratorMode::Start) {
            item?;
            count += 1;
        }
        Ok(count)
    }

    fn clear_all(&self) -> Result<(), Error> {
        let mut batch = WriteBatch::default();
        for item in self.db.iterator(IteratorMode::Start) {
            let (key, _) = item?;
            batch.delete(&key);
        }
        self.db.write(batch)?;
        info!("Source cache cleared");
        Ok(())
    }
}
