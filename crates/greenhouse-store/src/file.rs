//! Directory-backed store.
//!
//! Layout, one pair of files per document:
//!
//! ```text
//! <dir>/<id>.xml        raw bytes as received
//! <dir>/<id>.meta.json  StoredMetadata envelope (id, storedAt, rawSha256, metadata)
//! ```
//!
//! The raw file is written before the metadata file, so a document only
//! becomes visible once both are in place.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use greenhouse_model::{DocumentId, Metadata, StoredMetadata};

use crate::DocumentStore;
use crate::error::{PersistenceError, Result};
use crate::hash::sha256_hex;

const RAW_EXTENSION: &str = "xml";
const META_SUFFIX: &str = ".meta.json";

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| PersistenceError::Io {
            operation: "create directory",
            path: root.clone(),
            source: e,
        })?;
        tracing::debug!(root = %root.display(), "opened file store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_path(&self, id: &DocumentId) -> PathBuf {
        self.root.join(format!("{id}.{RAW_EXTENSION}"))
    }

    pub fn metadata_path(&self, id: &DocumentId) -> PathBuf {
        self.root.join(format!("{id}{META_SUFFIX}"))
    }

    fn read_envelope(&self, path: &Path) -> Result<StoredMetadata> {
        let bytes = fs::read(path).map_err(|e| PersistenceError::Io {
            operation: "read",
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| PersistenceError::Deserialization {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl DocumentStore for FileStore {
    fn store(&self, id: &DocumentId, raw: &[u8], metadata: &Metadata) -> Result<StoredMetadata> {
        let meta_path = self.metadata_path(id);
        if meta_path.exists() {
            return Err(PersistenceError::AlreadyExists { id: id.clone() });
        }

        let record = StoredMetadata {
            id: id.clone(),
            stored_at: Utc::now(),
            raw_sha256: sha256_hex(raw),
            metadata: metadata.clone(),
        };
        let json = serde_json::to_vec_pretty(&record)
            .map_err(|e| PersistenceError::Serialization { source: e })?;

        write_atomic(&self.raw_path(id), raw)?;
        write_atomic(&meta_path, &json)?;

        tracing::info!(
            id = %id,
            readings = record.metadata.readings.len(),
            "stored document"
        );
        Ok(record)
    }

    fn load_raw(&self, id: &DocumentId) -> Result<Option<Vec<u8>>> {
        let Some(record) = self.load_metadata(id)? else {
            return Ok(None);
        };
        let path = self.raw_path(id);
        let raw = fs::read(&path).map_err(|e| PersistenceError::Io {
            operation: "read",
            path: path.clone(),
            source: e,
        })?;

        let actual_hash = sha256_hex(&raw);
        if !actual_hash.eq_ignore_ascii_case(&record.raw_sha256) {
            tracing::warn!(id = %id, "stored document failed integrity check");
            return Err(PersistenceError::IntegrityMismatch {
                id: id.clone(),
                expected_hash: record.raw_sha256,
                actual_hash,
            });
        }
        Ok(Some(raw))
    }

    fn load_metadata(&self, id: &DocumentId) -> Result<Option<StoredMetadata>> {
        let path = self.metadata_path(id);
        let record = match self.read_envelope(&path) {
            Ok(record) => record,
            Err(PersistenceError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        if record.id != *id {
            return Err(PersistenceError::InvalidRecord {
                path,
                reason: format!("records id '{}'", record.id),
            });
        }
        Ok(Some(record))
    }

    fn list_all_metadata(&self) -> Result<Vec<StoredMetadata>> {
        let entries = fs::read_dir(&self.root).map_err(|e| PersistenceError::Io {
            operation: "list",
            path: self.root.clone(),
            source: e,
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PersistenceError::Io {
                operation: "list",
                path: self.root.clone(),
                source: e,
            })?;
            let file_name = entry.file_name();
            let Some(stem) = file_name.to_str().and_then(|n| n.strip_suffix(META_SUFFIX)) else {
                continue;
            };
            match DocumentId::new(stem) {
                Ok(id) => ids.push(id),
                Err(_) => tracing::debug!(file = stem, "skipping foreign metadata file"),
            }
        }
        ids.sort();

        let mut records = Vec::with_capacity(ids.len());
        for id in &ids {
            if let Some(record) = self.load_metadata(id)? {
                records.push(record);
            }
        }
        tracing::debug!(count = records.len(), "listed stored metadata");
        Ok(records)
    }
}

/// Write `bytes` to `path` via a temp file and rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let mut file = File::create(&temp_path).map_err(|e| PersistenceError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;

    file.write_all(bytes).map_err(|e| PersistenceError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;

    file.sync_all().map_err(|e| PersistenceError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| PersistenceError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_atomic_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.xml");

        write_atomic(&path, b"<greenhouse/>").unwrap();
        write_atomic(&path, b"<greenhouse></greenhouse>").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"<greenhouse></greenhouse>");
        assert!(!dir.path().join("a.xml.tmp").exists());
    }

    #[test]
    fn test_paths_are_named_after_id() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).unwrap();
        let id = DocumentId::new("reading_1").unwrap();

        assert!(store.root().is_dir());
        assert_eq!(store.raw_path(&id), dir.path().join("nested/reading_1.xml"));
        assert_eq!(
            store.metadata_path(&id),
            dir.path().join("nested/reading_1.meta.json")
        );
    }
}
