//! Durable identity profile store
//!
//! One JSON document per identity under the catalog folder, addressed by
//! a key derived from the identity id (`<folder>/<id>.json`). Persistence
//! is independent of matching policy: the store knows nothing about
//! similarity or thresholds.

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{CatalogEntry, IdentityRecord};

/// Extension of profile files; anything else in the folder is ignored
const PROFILE_EXTENSION: &str = "json";

/// Profile store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Profile file exists but does not parse; skipped during load,
    /// never deleted by the evictor
    #[error("Corrupt profile {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// I/O failure on a specific profile file
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog folder cannot be enumerated
    #[error("Cannot enumerate catalog folder {folder}: {source}")]
    Enumerate {
        folder: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record cannot be encoded for writing
    #[error("Serialize failed for profile {id}: {source}")]
    Serialize {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable catalog of identity records
pub struct IdentityStore {
    folder: PathBuf,
}

impl IdentityStore {
    /// Create a store over an existing catalog folder
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    /// Storage key for an identity id
    pub fn profile_path(&self, id: &str) -> PathBuf {
        self.folder.join(format!("{}.{}", id, PROFILE_EXTENSION))
    }

    /// Enumerate all persisted profiles, one result per unit
    ///
    /// Corrupt or unreadable units surface as per-unit errors so callers
    /// separate successes from failures explicitly; only a folder that
    /// cannot be enumerated at all is fatal. Order is directory
    /// enumeration order, not timestamp order.
    pub fn scan(&self) -> Result<Vec<Result<CatalogEntry, StoreError>>, StoreError> {
        let dir = fs::read_dir(&self.folder).map_err(|e| StoreError::Enumerate {
            folder: self.folder.clone(),
            source: e,
        })?;

        let mut units = Vec::new();
        for entry in dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    units.push(Err(StoreError::Io {
                        path: self.folder.clone(),
                        source: e,
                    }));
                    continue;
                }
            };

            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(PROFILE_EXTENSION) {
                continue;
            }

            units.push(Self::read_profile(&path));
        }

        Ok(units)
    }

    /// Load all parseable profiles, skipping corrupt units
    ///
    /// Per-unit failures are logged and dropped; losing one corrupt file
    /// must never prevent the rest of the catalog from loading.
    pub fn load_all(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        let mut loaded = Vec::new();
        for unit in self.scan()? {
            match unit {
                Ok(entry) => loaded.push(entry),
                Err(err) => {
                    tracing::warn!(error = %err, "Skipping unreadable profile during load");
                }
            }
        }
        Ok(loaded)
    }

    /// Write a profile with `last_seen = now`, creating or fully
    /// overwriting it (last-write-wins, no merge)
    ///
    /// The write goes to a temp file in the same folder and is renamed
    /// into place, so a concurrent or subsequent `load_all` observes
    /// either the old or the new complete record, never a partial one.
    /// Failures are fatal to this operation and leave any existing
    /// profile untouched.
    pub fn upsert(&self, id: &str, embedding: &[f32]) -> Result<CatalogEntry, StoreError> {
        let record = IdentityRecord {
            id: id.to_string(),
            embedding: embedding.to_vec(),
            last_seen: Utc::now(),
        };

        let path = self.profile_path(id);
        let encoded =
            serde_json::to_vec(&record).map_err(|e| StoreError::Serialize {
                id: id.to_string(),
                source: e,
            })?;

        let tmp_path = self.folder.join(format!("{}.{}.tmp", id, PROFILE_EXTENSION));
        fs::write(&tmp_path, &encoded).map_err(|e| StoreError::Io {
            path: tmp_path.clone(),
            source: e,
        })?;

        if let Err(e) = fs::rename(&tmp_path, &path) {
            // Do not leave the temp file behind on a failed replace
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::Io { path, source: e });
        }

        tracing::debug!(id = %record.id, path = %path.display(), "Persisted profile");

        Ok(CatalogEntry { record, path })
    }

    /// Remove a profile by storage key; idempotent
    pub fn delete(&self, path: &Path) -> Result<(), StoreError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    fn read_profile(path: &Path) -> Result<CatalogEntry, StoreError> {
        let content = fs::read(path).map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let record: IdentityRecord =
            serde_json::from_slice(&content).map_err(|e| StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Ok(CatalogEntry {
            record,
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_store() -> (tempfile::TempDir, IdentityStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = IdentityStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_upsert_load_roundtrip() {
        let (_dir, store) = test_store();

        let before = Utc::now();
        let embedding = vec![0.25_f32, -1.5, 0.0, 3.125];
        store.upsert("User_1", &embedding).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].record.id, "User_1");
        assert_eq!(loaded[0].record.embedding, embedding);
        assert!(loaded[0].record.last_seen >= before);
    }

    #[test]
    fn test_upsert_overwrites_existing() {
        let (_dir, store) = test_store();

        let first = store.upsert("User_1", &[1.0, 0.0]).unwrap();
        let second = store.upsert("User_1", &[0.0, 1.0]).unwrap();
        assert!(second.record.last_seen >= first.record.last_seen);

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].record.embedding, vec![0.0, 1.0]);
    }

    #[test]
    fn test_load_skips_corrupt_units() {
        let (dir, store) = test_store();

        store.upsert("User_1", &[1.0]).unwrap();
        store.upsert("User_2", &[2.0]).unwrap();
        std::fs::write(dir.path().join("User_3.json"), b"{ not json").unwrap();
        std::fs::write(dir.path().join("truncated.json"), b"").unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 2);

        let units = store.scan().unwrap();
        assert_eq!(units.len(), 4);
        let corrupt = units
            .iter()
            .filter(|u| matches!(u, Err(StoreError::Corrupt { .. })))
            .count();
        assert_eq!(corrupt, 2);
    }

    #[test]
    fn test_scan_ignores_non_profile_files() {
        let (dir, store) = test_store();

        store.upsert("User_1", &[1.0]).unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"unrelated").unwrap();
        std::fs::write(dir.path().join("User_9.json.tmp"), b"partial").unwrap();

        let units = store.scan().unwrap();
        assert_eq!(units.len(), 1);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_dir, store) = test_store();

        let entry = store.upsert("User_1", &[1.0]).unwrap();
        store.delete(&entry.path).unwrap();
        assert!(store.load_all().unwrap().is_empty());

        // Deleting a missing key is not an error
        store.delete(&entry.path).unwrap();
    }

    #[test]
    fn test_upsert_leaves_no_temp_file() {
        let (dir, store) = test_store();

        store.upsert("User_1", &[1.0]).unwrap();

        let stray: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(stray.is_empty(), "temp files left behind: {:?}", stray);
    }

    #[test]
    fn test_failed_upsert_leaves_existing_profile_intact() {
        let (dir, store) = test_store();

        store.upsert("User_1", &[1.0, 0.0]).unwrap();
        let before = store.load_all().unwrap();

        // Block the temp-file path so the replacement write fails
        // before the rename ever happens
        std::fs::create_dir(dir.path().join("User_1.json.tmp")).unwrap();

        let result = store.upsert("User_1", &[9.0, 9.0]);
        assert!(matches!(result, Err(StoreError::Io { .. })));

        // The original record is still on disk, byte-for-byte readable
        let after = store.load_all().unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].record.id, "User_1");
        assert_eq!(after[0].record.embedding, vec![1.0, 0.0]);
        assert_eq!(after[0].record.last_seen, before[0].record.last_seen);
    }

    #[test]
    fn test_scan_fails_on_missing_folder() {
        let store = IdentityStore::new("/nonexistent/voicegate/voice_db");
        assert!(matches!(
            store.scan(),
            Err(StoreError::Enumerate { .. })
        ));
    }
}
