//! Metadata Store
//!
//! Persistence of the [`MetadataDocument`] between runs. The document is the
//! only state carried from one invocation to the next.

pub mod file;
pub mod memory;

use crate::document::MetadataDocument;
use crate::error::StorageError;

pub use file::{DocumentFormat, FileStore};
pub use memory::MemoryStore;

/// Metadata document storage interface
pub trait MetadataStore: Send + Sync {
    /// The stored document, or `None` if nothing has been stored yet
    fn load(&self) -> Result<Option<MetadataDocument>, StorageError>;

    /// Store `document`, replacing any previous one
    fn save(&self, document: &MetadataDocument) -> Result<(), StorageError>;

    /// Delete the stored document. Returns whether one existed.
    fn remove(&self) -> Result<bool, StorageError>;

    fn exists(&self) -> Result<bool, StorageError>;

    /// Location shown in messages
    fn location(&self) -> String;

    /// Store a first document, refusing to overwrite an existing one
    fn create(&self, document: &MetadataDocument) -> Result<(), StorageError> {
        if self.exists()? {
            return Err(StorageError::AlreadyExists(self.location()));
        }
        self.save(document)
    }
}
