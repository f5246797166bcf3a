//! File-backed metadata store (YAML or JSON)

use crate::document::MetadataDocument;
use crate::error::StorageError;
use crate::store::MetadataStore;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Serialization format, chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// Document stored in a single file. Writes go to a sibling temporary file
/// that is renamed over the target.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    format: DocumentFormat,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = DocumentFormat::from_path(&path);
        Self { path, format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::IoError {
            path: self.location(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "metadata".to_string());
        self.path.with_file_name(format!(".{}.tmp", name))
    }

    fn encode(&self, document: &MetadataDocument) -> Result<String, StorageError> {
        Ok(match self.format {
            DocumentFormat::Yaml => serde_yaml::to_string(document)?,
            DocumentFormat::Json => serde_json::to_string_pretty(document)?,
        })
    }

    fn decode(&self, text: &str) -> Result<MetadataDocument, StorageError> {
        Ok(match self.format {
            DocumentFormat::Yaml => serde_yaml::from_str(text)?,
            DocumentFormat::Json => serde_json::from_str(text)?,
        })
    }
}

impl MetadataStore for FileStore {
    fn load(&self) -> Result<Option<MetadataDocument>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };
        let document = self.decode(&text)?;
        debug!(path = %self.path.display(), "Loaded metadata document");
        Ok(Some(document))
    }

    fn save(&self, document: &MetadataDocument) -> Result<(), StorageError> {
        let text = self.encode(document)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }
        let temp = self.temp_path();
        fs::write(&temp, text).map_err(|e| self.io_error(e))?;
        if let Err(err) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(self.io_error(err));
        }
        info!(path = %self.path.display(), "Saved metadata document");
        Ok(())
    }

    fn remove(&self) -> Result<bool, StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(self.io_error(err)),
        }
    }

    fn exists(&self) -> Result<bool, StorageError> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(self.io_error(err)),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
