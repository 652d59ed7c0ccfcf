//! The trade store.

use crate::store::error::StoreError;
use crate::store::locks::KeyedLocks;
use crate::store::record::{
    TIMESTAMP_FIELD, TRADE_ID_FIELD, TradeRecord, UPDATED_TIMESTAMP_FIELD, is_valid_trade_id,
    now_iso8601,
};
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;


/// Extension of record files.
const RECORD_EXTENSION: &str = "json";

/// Suffix of staging files written before the rename into place.
const STAGING_SUFFIX: &str = ".json.tmp";

/// Durable key-value store for trade records, keyed by `trade_id`.
///
/// Writes for a given identifier are serialized through [`KeyedLocks`] and
/// land via write-then-rename, so readers never observe a partial file.
#[derive(Debug)]
pub struct TradeStore {
    dir: PathBuf,
    locks: KeyedLocks,
    skipped_records: AtomicU64,
}

impl TradeStore {
    /// Opens a store rooted at `dir`, creating the directory if missing.
    ///
    /// Staging files left by writes that never reached their rename are
    /// removed. Open the store before serving writes from it.
    ///
    /// # Errors
    /// Returns [`StoreError::CreateContainer`] if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|source| StoreError::CreateContainer {
                path: dir.clone(),
                source,
            })?;

        let swept = sweep_staging_files(&dir).await;
        if swept > 0 {
            warn!(count = swept, "Removed stale staging files");
        }

        info!("Trade store ready at {}", dir.display());

        Ok(Self {
            dir,
            locks: KeyedLocks::default(),
            skipped_records: AtomicU64::new(0),
        })
    }

    /// Returns the container directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of unreadable record files skipped by [`TradeStore::get_all`]
    /// since the store was opened.
    #[must_use]
    pub fn skipped_records(&self) -> u64 {
        self.skipped_records.load(Ordering::Relaxed)
    }

    /// Persists a record, assigning `trade_id` and `timestamp` when absent.
    ///
    /// The record is updated in place with the injected fields. An existing
    /// record with the same identifier is overwritten.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidTradeId`] if the record carries an
    /// identifier that cannot name a file, or a write error from the medium.
    pub async fn save(&self, record: &mut TradeRecord) -> Result<String, StoreError> {
        let trade_id = match supplied_trade_id(record)? {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                record.insert(TRADE_ID_FIELD, id.clone());
                id
            }
        };

        if !record.contains_field(TIMESTAMP_FIELD) {
            record.insert(TIMESTAMP_FIELD, now_iso8601());
        }

        let _guard = self.locks.lock(&trade_id).await;
        self.write_record(&trade_id, record).await?;
        info!(trade_id = %trade_id, "Trade saved");

        Ok(trade_id)
    }

    /// Loads a record.
    ///
    /// Returns `Ok(None)` when no record exists under `trade_id`.
    ///
    /// # Errors
    /// Returns [`StoreError::Read`] or [`StoreError::Corrupt`] when the file
    /// exists but cannot be loaded.
    pub async fn get(&self, trade_id: &str) -> Result<Option<TradeRecord>, StoreError> {
        if !is_valid_trade_id(trade_id) {
            debug!(trade_id = %trade_id, "Lookup with unusable trade_id");
            return Ok(None);
        }
        self.read_record(trade_id).await
    }

    /// Returns true if a record exists under `trade_id`.
    ///
    /// # Errors
    /// Returns [`StoreError::Read`] if existence cannot be determined.
    pub async fn contains(&self, trade_id: &str) -> Result<bool, StoreError> {
        if !is_valid_trade_id(trade_id) {
            return Ok(false);
        }
        fs::try_exists(self.record_path(trade_id))
            .await
            .map_err(|source| StoreError::Read {
                trade_id: trade_id.to_string(),
                source,
            })
    }

    /// Loads every record in the container, in no particular order.
    ///
    /// Files that cannot be read or parsed are logged, counted in
    /// [`TradeStore::skipped_records`] and left out of the result.
    ///
    /// # Errors
    /// Returns [`StoreError::List`] if the directory cannot be enumerated.
    pub async fn get_all(&self) -> Result<Vec<TradeRecord>, StoreError> {
        let list_err = |source| StoreError::List {
            path: self.dir.clone(),
            source,
        };

        let mut entries = fs::read_dir(&self.dir).await.map_err(list_err)?;
        let mut records = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }

            match load_file(&path).await {
                Ok(record) => records.push(record),
                Err(err) => {
                    self.skipped_records.fetch_add(1, Ordering::Relaxed);
                    warn!("Skipping unreadable trade file {}: {}", path.display(), err);
                }
            }
        }

        debug!(count = records.len(), "Loaded all trades");
        Ok(records)
    }

    /// Replaces an existing record with `record`.
    ///
    /// `trade_id` is forced to the given identifier and `updated_timestamp`
    /// to the current time. All other fields come from `record` alone; fields
    /// of the previous version that are not resent are dropped.
    ///
    /// Returns `Ok(None)` without writing when no record exists.
    ///
    /// # Errors
    /// Returns a read or write error from the medium.
    pub async fn replace(
        &self,
        trade_id: &str,
        mut record: TradeRecord,
    ) -> Result<Option<TradeRecord>, StoreError> {
        if !is_valid_trade_id(trade_id) {
            return Ok(None);
        }

        let _guard = self.locks.lock(trade_id).await;
        if !self.contains(trade_id).await? {
            return Ok(None);
        }

        record.insert(TRADE_ID_FIELD, trade_id);
        record.insert(UPDATED_TIMESTAMP_FIELD, now_iso8601());
        self.write_record(trade_id, &record).await?;
        info!(trade_id = %trade_id, "Trade replaced");

        Ok(Some(record))
    }

    /// Removes a record permanently.
    ///
    /// Returns `Ok(false)` when there was nothing to remove.
    ///
    /// # Errors
    /// Returns [`StoreError::Delete`] if the file exists but cannot be removed.
    pub async fn delete(&self, trade_id: &str) -> Result<bool, StoreError> {
        if !is_valid_trade_id(trade_id) {
            return Ok(false);
        }

        let _guard = self.locks.lock(trade_id).await;
        match fs::remove_file(self.record_path(trade_id)).await {
            Ok(()) => {
                info!(trade_id = %trade_id, "Trade deleted");
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Delete {
                trade_id: trade_id.to_string(),
                source,
            }),
        }
    }

    fn record_path(&self, trade_id: &str) -> PathBuf {
        self.dir.join(format!("{trade_id}.{RECORD_EXTENSION}"))
    }

    fn staging_path(&self, trade_id: &str) -> PathBuf {
        self.dir.join(format!(".{trade_id}.{RECORD_EXTENSION}.tmp"))
    }

    async fn read_record(&self, trade_id: &str) -> Result<Option<TradeRecord>, StoreError> {
        let bytes = match fs::read(self.record_path(trade_id)).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    trade_id: trade_id.to_string(),
                    source,
                });
            }
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                trade_id: trade_id.to_string(),
                source,
            })
    }

    /// Caller must hold the lock for `trade_id`.
    async fn write_record(&self, trade_id: &str, record: &TradeRecord) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(record).map_err(|source| StoreError::Serialize {
            trade_id: trade_id.to_string(),
            source,
        })?;

        let staging = self.staging_path(trade_id);
        let write_err = |source| StoreError::Write {
            trade_id: trade_id.to_string(),
            source,
        };

        fs::write(&staging, &body).await.map_err(write_err)?;
        if let Err(source) = fs::rename(&staging, self.record_path(trade_id)).await {
            let _ = fs::remove_file(&staging).await;
            return Err(write_err(source));
        }

        Ok(())
    }
}

/// Extracts a caller-supplied identifier.
///
/// A missing, `null` or empty `trade_id` means the store should generate one.
fn supplied_trade_id(record: &TradeRecord) -> Result<Option<String>, StoreError> {
    match record.get(TRADE_ID_FIELD) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) if id.is_empty() => Ok(None),
        Some(Value::String(id)) if is_valid_trade_id(id) => Ok(Some(id.clone())),
        Some(other) => Err(StoreError::InvalidTradeId(other.to_string())),
    }
}

fn is_staging_file(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(STAGING_SUFFIX)
}

/// Best effort: failures are logged and the file is left in place.
async fn sweep_staging_files(dir: &Path) -> usize {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) => {
            warn!("Cannot scan {} for staging files: {}", dir.display(), err);
            return 0;
        }
    };

    let mut removed = 0;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let stale = entry.file_name().to_str().is_some_and(is_staging_file);
        if !stale {
            continue;
        }
        match fs::remove_file(entry.path()).await {
            Ok(()) => removed += 1,
            Err(err) => warn!("Cannot remove {}: {}", entry.path().display(), err),
        }
    }
    removed
}

async fn load_file(path: &Path) -> Result<TradeRecord, Box<dyn std::error::Error + Send + Sync>> {
    let bytes = fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
