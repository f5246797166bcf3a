//! Configuration
//!
//! Layered with the `config` crate: built-in defaults, then the workspace file
//! `.modtree/config.toml`, then `MODTREE__*` environment variables.

pub mod facade;
pub mod merge {
    pub mod service;
}
pub mod sources {
    pub mod environment;
    pub mod workspace_file;
}
pub mod workspace {
    pub mod storage_paths;
}

use crate::annotation::AnnotationConfig;
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::tree::BudgetConfig;
use serde::{Deserialize, Serialize};

pub use facade::ConfigLoader;
pub use workspace::storage_paths::StorageConfig;

/// Every tunable of the crate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModtreeConfig {
    #[serde(default)]
    pub budget: BudgetConfig,

    #[serde(default)]
    pub annotation: AnnotationConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ModtreeConfig {
    pub fn validate(&self) -> Result<(), ApiError> {
        self.budget.validate().map_err(ApiError::ConfigError)?;
        self.annotation.validate().map_err(ApiError::ConfigError)?;
        self.storage.validate().map_err(ApiError::ConfigError)?;
        self.logging.validate().map_err(ApiError::ConfigError)?;
        Ok(())
    }
}
