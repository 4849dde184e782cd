//! In-process store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::Utc;
use greenhouse_model::{DocumentId, Metadata, StoredMetadata};

use crate::DocumentStore;
use crate::error::{PersistenceError, Result};
use crate::hash::sha256_hex;

#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<BTreeMap<DocumentId, (Vec<u8>, StoredMetadata)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<DocumentId, (Vec<u8>, StoredMetadata)>>>
    {
        self.documents
            .read()
            .map_err(|_| PersistenceError::LockPoisoned)
    }
}

impl DocumentStore for MemoryStore {
    fn store(&self, id: &DocumentId, raw: &[u8], metadata: &Metadata) -> Result<StoredMetadata> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| PersistenceError::LockPoisoned)?;
        if documents.contains_key(id) {
            return Err(PersistenceError::AlreadyExists { id: id.clone() });
        }
        let record = StoredMetadata {
            id: id.clone(),
            stored_at: Utc::now(),
            raw_sha256: sha256_hex(raw),
            metadata: metadata.clone(),
        };
        documents.insert(id.clone(), (raw.to_vec(), record.clone()));
        tracing::debug!(id = %id, "stored document in memory");
        Ok(record)
    }

    fn load_raw(&self, id: &DocumentId) -> Result<Option<Vec<u8>>> {
        Ok(self.read()?.get(id).map(|(raw, _)| raw.clone()))
    }

    fn load_metadata(&self, id: &DocumentId) -> Result<Option<StoredMetadata>> {
        Ok(self.read()?.get(id).map(|(_, record)| record.clone()))
    }

    fn list_all_metadata(&self) -> Result<Vec<StoredMetadata>> {
        Ok(self
            .read()?
            .values()
            .map(|(_, record)| record.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_tracks_stores() {
        let store = MemoryStore::new();
        assert!(store.is_empty().unwrap());

        let id = DocumentId::new("reading_a").unwrap();
        store.store(&id, b"<x/>", &Metadata::default()).unwrap();

        assert_eq!(store.len().unwrap(), 1);
        assert!(matches!(
            store.store(&id, b"<y/>", &Metadata::default()),
            Err(PersistenceError::AlreadyExists { .. })
        ));
        assert_eq!(store.load_raw(&id).unwrap().unwrap(), b"<x/>");
    }
}
