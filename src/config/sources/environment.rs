//! Environment variable source: MODTREE prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::Map;

pub const ENV_PREFIX: &str = "MODTREE";

/// Layer `MODTREE__*` variables over everything added before.
/// `MODTREE__BUDGET__MAX_WEIGHT=50000` sets `budget.max_weight`.
///
/// `vars` replaces the process environment when given.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    vars: Option<Map<String, String>>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(vars),
    ))
}
