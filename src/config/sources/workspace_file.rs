//! Workspace file source: `<root>/.modtree/config.toml`, optional

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::{Path, PathBuf};

pub fn config_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(".modtree").join("config.toml")
}

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(File::from(config_path(workspace_root)).required(false)))
}
