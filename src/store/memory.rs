//! In-memory metadata store

use crate::document::MetadataDocument;
use crate::error::StorageError;
use crate::store::MetadataStore;
use parking_lot::RwLock;

/// Keeps the document in process memory; nothing survives the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: RwLock<Option<MetadataDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetadataStore for MemoryStore {
    fn load(&self) -> Result<Option<MetadataDocument>, StorageError> {
        Ok(self.document.read().clone())
    }

    fn save(&self, document: &MetadataDocument) -> Result<(), StorageError> {
        *self.document.write() = Some(document.clone());
        Ok(())
    }

    fn remove(&self) -> Result<bool, StorageError> {
        Ok(self.document.write().take().is_some())
    }

    fn exists(&self) -> Result<bool, StorageError> {
        Ok(self.document.read().is_some())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
