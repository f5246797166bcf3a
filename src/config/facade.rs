//! ConfigLoader facade delegating to the merge service and validating the result.

use super::merge::service::MergeService;
use super::ModtreeConfig;
use crate::error::ApiError;
use config::Map;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace from its file and the environment.
    pub fn load(workspace_root: &Path) -> Result<ModtreeConfig, ApiError> {
        let config = MergeService::load(workspace_root)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<ModtreeConfig, ApiError> {
        let config = MergeService::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, reading `MODTREE__*` overrides from
    /// `vars` instead of the process environment.
    pub fn load_from_file_with_env(
        path: &Path,
        vars: Map<String, String>,
    ) -> Result<ModtreeConfig, ApiError> {
        let config = MergeService::load_from_file_with_env(path, Some(vars))?;
        config.validate()?;
        Ok(config)
    }

    pub fn default() -> ModtreeConfig {
        ModtreeConfig::default()
    }
}
