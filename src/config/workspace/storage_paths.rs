//! StorageConfig: where the metadata document lives.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_metadata_path() -> PathBuf {
    PathBuf::from(".modtree/metadata.yaml")
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Metadata document, relative to the workspace root unless absolute.
    /// A `.json` extension selects JSON, anything else YAML.
    #[serde(default = "default_metadata_path")]
    pub metadata_path: PathBuf,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.metadata_path.as_os_str().is_empty() {
            return Err("storage.metadata_path must not be empty".to_string());
        }
        Ok(())
    }

    /// Resolve the metadata path against the workspace root
    pub fn resolve_metadata_path(&self, workspace_root: &Path) -> PathBuf {
        if self.metadata_path.is_absolute() {
            self.metadata_path.clone()
        } else {
            workspace_root.join(&self.metadata_path)
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            metadata_path: default_metadata_path(),
        }
    }
}
