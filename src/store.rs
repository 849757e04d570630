//! The favorites collection and its snapshot persistence.
//!
//! Every mutation rewrites the whole snapshot under a single storage key. The
//! store never validates what it loads: records are only checked when created.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::record::MovieRecord;
use crate::storage::KeyValueStore;

#[derive(Error, Debug)]
pub enum StoreError {
  #[error("Title must not be empty.")]
  EmptyTitle,

  #[error("Genre must not be empty.")]
  EmptyGenre,

  #[error("Year must be a whole number, got '{0}'.")]
  InvalidYear(String),

  /// The in-memory change was applied but the snapshot could not be written.
  #[error("Failed to save favorites: {0}")]
  Persist(String),
}

impl StoreError {
  /// Validation failures leave the store untouched; persistence failures do not.
  pub fn is_validation(&self) -> bool {
    !matches!(self, StoreError::Persist(_))
  }
}

pub struct RecordStore {
  records: Vec<MovieRecord>,
  backend: Box<dyn KeyValueStore>,
  key: String,
}

impl RecordStore {
  /// Create an empty store bound to `key` in `backend`. Call [`RecordStore::load`] to read the snapshot.
  pub fn new(backend: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
    Self { records: Vec::new(), backend, key: key.into() }
  }

  /// Replace the in-memory collection with the persisted snapshot.
  ///
  /// A missing, unreadable or malformed snapshot all produce an empty collection.
  pub fn load(&mut self) {
    self.records = match self.backend.get(&self.key) {
      Ok(Some(raw)) => match serde_json::from_str::<Vec<MovieRecord>>(&raw) {
        Ok(records) => records,
        Err(e) => {
          warn!(key = %self.key, err = %e, "store: snapshot is malformed, starting empty");
          Vec::new()
        }
      },
      Ok(None) => Vec::new(),
      Err(e) => {
        warn!(key = %self.key, err = %format!("{:#}", e), "store: snapshot unreadable, starting empty");
        Vec::new()
      }
    };
    info!(count = self.records.len(), "store: loaded snapshot");
  }

  /// Validate and append a new record, then persist the whole collection.
  ///
  /// On `StoreError::Persist` the record has still been appended in memory.
  pub fn add(&mut self, title: &str, genre: &str, year: &str) -> Result<MovieRecord, StoreError> {
    let title = title.trim();
    let genre = genre.trim();
    if title.is_empty() {
      return Err(StoreError::EmptyTitle);
    }
    if genre.is_empty() {
      return Err(StoreError::EmptyGenre);
    }
    let year: i32 = year.trim().parse().map_err(|_| StoreError::InvalidYear(year.trim().to_string()))?;

    let record = MovieRecord {
      id: self.next_id(chrono::Utc::now().timestamp_millis()),
      title: title.to_string(),
      genre: genre.to_string(),
      year,
    };
    info!(id = record.id, title = %record.title, "store: added record");
    self.records.push(record.clone());
    self.persist()?;
    Ok(record)
  }

  /// Remove the record with `id`, then persist. Returns whether a record was removed.
  ///
  /// Removing an unknown id is a no-op, but the snapshot is still rewritten.
  pub fn remove(&mut self, id: i64) -> Result<bool, StoreError> {
    let before = self.records.len();
    self.records.retain(|r| r.id != id);
    let removed = self.records.len() != before;
    if removed {
      info!(id, "store: removed record");
    } else {
      debug!(id, "store: remove of unknown id");
    }
    self.persist()?;
    Ok(removed)
  }

  /// Serialize the full collection and overwrite the stored snapshot.
  pub fn persist(&mut self) -> Result<(), StoreError> {
    let raw = serde_json::to_string(&self.records).map_err(|e| StoreError::Persist(e.to_string()))?;
    self.backend.set(&self.key, &raw).map_err(|e| StoreError::Persist(format!("{:#}", e)))?;
    debug!(count = self.records.len(), bytes = raw.len(), "store: snapshot written");
    Ok(())
  }

  pub fn get(&self, id: i64) -> Option<&MovieRecord> {
    self.records.iter().find(|r| r.id == id)
  }

  pub fn records(&self) -> &[MovieRecord] {
    &self.records
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// Millisecond clock value, bumped past the largest existing id so ids stay unique.
  fn next_id(&self, now_ms: i64) -> i64 {
    match self.records.iter().map(|r| r.id).max() {
      Some(max) if now_ms <= max => match max.checked_add(1) {
        Some(id) => id,
        // Loaded data already holds i64::MAX: take the nearest free id at or below the clock.
        None => (i64::MIN..=now_ms).rev().find(|id| self.get(*id).is_none()).unwrap_or(now_ms),
      },
      _ => now_ms,
    }
  }
}
