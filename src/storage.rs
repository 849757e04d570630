//! Key-value string storage for snapshots.
//!
//! `FileStore` keeps one file per key under a directory (`<dir>/<key>.json`).
//! Writes go to a temp file in the same directory that is renamed over the
//! target, so a key holds either the old value or the new one.
//! `MemoryStore` holds everything in a map and never touches the disk.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::constants::constants;

pub trait KeyValueStore {
  /// Read the value stored under `key`, or `None` if nothing was ever written.
  fn get(&self, key: &str) -> Result<Option<String>>;

  /// Overwrite the value stored under `key`.
  fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Default data directory (`~/.local/share/reel` on Linux).
pub fn default_data_dir() -> Option<PathBuf> {
  ProjectDirs::from("", "", &constants().app_name).map(|dirs| dirs.data_dir().to_path_buf())
}

#[derive(Debug, Clone)]
pub struct FileStore {
  dir: PathBuf,
}

impl FileStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  fn path_for(&self, key: &str) -> PathBuf {
    self.dir.join(format!("{}.json", key))
  }
}

impl KeyValueStore for FileStore {
  fn get(&self, key: &str) -> Result<Option<String>> {
    let path = self.path_for(key);
    match std::fs::read_to_string(&path) {
      Ok(content) => Ok(Some(content)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
  }

  fn set(&mut self, key: &str, value: &str) -> Result<()> {
    std::fs::create_dir_all(&self.dir).with_context(|| format!("Failed to create {}", self.dir.display()))?;
    replace_file(&self.path_for(key), |file| file.write_all(value.as_bytes()))
  }
}

/// Write `path` through a sibling temp file; `path` is only replaced once `write` succeeds.
fn replace_file(path: &Path, write: impl FnOnce(&mut NamedTempFile) -> std::io::Result<()>) -> Result<()> {
  let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
  let mut tmp = NamedTempFile::new_in(dir).with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
  write(&mut tmp).with_context(|| format!("Failed to write {}", path.display()))?;
  tmp.as_file().sync_all().with_context(|| format!("Failed to sync {}", path.display()))?;
  tmp.persist(path).map_err(|e| e.error).with_context(|| format!("Failed to replace {}", path.display()))?;
  Ok(())
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
  entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
  fn get(&self, key: &str) -> Result<Option<String>> {
    Ok(self.entries.get(key).cloned())
  }

  fn set(&mut self, key: &str, value: &str) -> Result<()> {
    self.entries.insert(key.to_string(), value.to_string());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn memory_store_get_missing_is_none() {
    let store = MemoryStore::default();
    assert_eq!(store.get("nope").unwrap(), None);
  }

  #[test]
  fn memory_store_set_overwrites() {
    let mut store = MemoryStore::default();
    store.set("k", "one").unwrap();
    store.set("k", "two").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
  }

  #[test]
  fn file_store_missing_key_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    assert_eq!(store.get("filmesFavoritos").unwrap(), None);
  }

  #[test]
  fn file_store_creates_directory_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let mut store = FileStore::new(&nested);
    store.set("k", "[]").unwrap();
    assert!(nested.join("k.json").exists());
    assert_eq!(store.get("k").unwrap().as_deref(), Some("[]"));
  }

  #[test]
  fn file_store_set_replaces_whole_value() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());
    store.set("k", "a much longer first value").unwrap();
    store.set("k", "short").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("short"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
  }

  #[test]
  fn interrupted_write_keeps_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());
    let snapshot = r#"[{"id":1,"titulo":"Heat","genero":"Crime","ano":1995}]"#;
    store.set("filmesFavoritos", snapshot).unwrap();

    let path = dir.path().join("filmesFavoritos.json");
    let result = replace_file(&path, |file| {
      file.write_all(br#"[{"id":1,"titu"#)?;
      Err(std::io::Error::other("disk full"))
    });

    assert!(result.is_err());
    assert_eq!(store.get("filmesFavoritos").unwrap().as_deref(), Some(snapshot));
    // The abandoned temp file is cleaned up on drop.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
  }

  #[test]
  fn file_store_keys_are_separate_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());
    store.set("a", "1").unwrap();
    store.set("b", "2").unwrap();
    assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
  }
}
