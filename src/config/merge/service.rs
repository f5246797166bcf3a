//! MergeService: orchestrates sources and deserializes to ModtreeConfig.

use crate::config::sources::{environment, workspace_file};
use crate::config::ModtreeConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, Map};
use std::path::Path;

/// Builds the layered configuration: defaults, workspace file, environment.
pub struct MergeService;

impl MergeService {
    /// Load config for a workspace.
    /// Precedence: defaults (lowest) -> workspace file -> environment (highest).
    pub fn load(workspace_root: &Path) -> Result<ModtreeConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder, None)?;

        builder.build()?.try_deserialize()
    }

    /// Defaults, then `path` (which must exist), then the environment.
    pub fn load_from_file(path: &Path) -> Result<ModtreeConfig, ConfigError> {
        Self::load_from_file_with_env(path, None)
    }

    /// As [`MergeService::load_from_file`], with `vars` standing in for the
    /// process environment when given
    pub fn load_from_file_with_env(
        path: &Path,
        vars: Option<Map<String, String>>,
    ) -> Result<ModtreeConfig, ConfigError> {
        let builder = builder_with_defaults()?.add_source(File::from(path.to_path_buf()));
        let builder = environment::add_to_builder(builder, vars)?;

        builder.build()?.try_deserialize()
    }
}

/// Builder seeded with every default value, so partial files stay valid
fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = Config::try_from(&ModtreeConfig::default())?;
    Ok(Config::builder().add_source(defaults))
}
