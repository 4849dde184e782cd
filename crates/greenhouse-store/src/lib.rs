//! Storage for accepted greenhouse telemetry documents.
//!
//! A document is stored as its raw bytes plus the [`Metadata`] produced by
//! validation, wrapped in a [`StoredMetadata`] envelope that records when it
//! was stored and the SHA-256 of the raw bytes.
//!
//! # Features
//!
//! - **Atomic writes** (temp file + rename) in [`FileStore`]
//! - **Tamper detection**: [`FileStore`] re-hashes raw bytes on load
//! - [`MemoryStore`] for tests and embedding
//!
//! Identifiers are chosen by the caller; stores never generate them.

mod error;
mod file;
mod hash;
mod memory;

use greenhouse_model::{DocumentId, Metadata, StoredMetadata};

pub use error::{PersistenceError, Result};
pub use file::FileStore;
pub use hash::{sha256_hex, verify_hash};
pub use memory::MemoryStore;

/// Persistence operations used by ingest and query.
pub trait DocumentStore: Send + Sync {
    /// Persist raw bytes and metadata under `id`. Fails if `id` is taken.
    fn store(&self, id: &DocumentId, raw: &[u8], metadata: &Metadata) -> Result<StoredMetadata>;

    /// Raw bytes of a stored document, `None` if unknown.
    fn load_raw(&self, id: &DocumentId) -> Result<Option<Vec<u8>>>;

    /// Metadata envelope of a stored document, `None` if unknown.
    fn load_metadata(&self, id: &DocumentId) -> Result<Option<StoredMetadata>>;

    /// Every stored envelope, ordered by id.
    fn list_all_metadata(&self) -> Result<Vec<StoredMetadata>>;
}
