//! Logging
//!
//! Structured logging through `tracing`. Level, format and destination come
//! from [`LoggingConfig`]; the `MODTREE_LOG*` environment variables win over
//! whatever the configuration says.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt as stdfmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const LOG_FILE_NAME: &str = "modtree.log";

const ENV_FILTER: &str = "MODTREE_LOG";
const ENV_FORMAT: &str = "MODTREE_LOG_FORMAT";
const ENV_OUTPUT: &str = "MODTREE_LOG_OUTPUT";
const ENV_FILE: &str = "MODTREE_LOG_FILE";
const ENV_MODULES: &str = "MODTREE_LOG_MODULES";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ApiError::ConfigError(format!(
                "invalid log format {:?}, expected \"text\" or \"json\"",
                other
            ))),
        }
    }
}

/// Where log lines go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogOutput {
    #[serde(rename = "stdout")]
    Stdout,
    #[default]
    #[serde(rename = "stderr")]
    Stderr,
    #[serde(rename = "file")]
    File,
    #[serde(rename = "file+stderr")]
    FileAndStderr,
    /// stdout and stderr
    #[serde(rename = "both")]
    Both,
}

impl LogOutput {
    fn writes_file(self) -> bool {
        matches!(self, Self::File | Self::FileAndStderr)
    }
}

impl FromStr for LogOutput {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            "file" => Ok(Self::File),
            "file+stderr" => Ok(Self::FileAndStderr),
            "both" => Ok(Self::Both),
            other => Err(ApiError::ConfigError(format!(
                "invalid log output {:?}, expected one of stdout, stderr, file, file+stderr, both",
                other
            ))),
        }
    }
}

impl stdfmt::Display for LogOutput {
    fn fmt(&self, f: &mut stdfmt::Formatter<'_>) -> stdfmt::Result {
        f.write_str(match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
            Self::File => "file",
            Self::FileAndStderr => "file+stderr",
            Self::Both => "both",
        })
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,

    /// trace, debug, info, warn, error or off
    pub level: String,

    pub format: LogFormat,

    pub output: LogOutput,

    /// Log file for the file outputs. Unset means the platform state directory.
    pub file: Option<PathBuf>,

    /// ANSI colors for text written to a terminal
    pub color: bool,

    /// Per-target levels, e.g. `"modtree::annotation" = "debug"`
    pub modules: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file: None,
            color: true,
            modules: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), String> {
        parse_level(&self.level)?;
        for (target, level) in &self.modules {
            parse_level(level).map_err(|e| format!("logging.modules.{}: {}", target, e))?;
        }
        Ok(())
    }
}

fn parse_level(level: &str) -> Result<LevelFilter, String> {
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| format!("invalid log level {:?}", level))
}

/// Log file location: `MODTREE_LOG_FILE`, then the configured path, then the
/// platform state directory (scoped under the workspace path when given).
pub fn resolve_log_file_path(
    configured: Option<PathBuf>,
    workspace: Option<&Path>,
) -> Result<PathBuf, ApiError> {
    let from_env = std::env::var(ENV_FILE).ok().filter(|p| !p.is_empty());
    if let Some(path) = from_env {
        return Ok(PathBuf::from(path));
    }
    match configured {
        Some(path) if !path.as_os_str().is_empty() => Ok(path),
        _ => state_log_file(workspace),
    }
}

fn state_log_file(workspace: Option<&Path>) -> Result<PathBuf, ApiError> {
    let dirs = directories::ProjectDirs::from("", "modtree", "modtree").ok_or_else(|| {
        ApiError::ConfigError("no home directory to place the log file in".to_string())
    })?;
    // state_dir is only defined on Linux
    let mut dir = dirs
        .state_dir()
        .unwrap_or_else(|| dirs.data_local_dir())
        .to_path_buf();
    if let Some(workspace) = workspace {
        let canonical = dunce::canonicalize(workspace).map_err(|e| {
            ApiError::ConfigError(format!("cannot resolve workspace {:?}: {}", workspace, e))
        })?;
        dir.extend(canonical.components().filter_map(|c| match c {
            std::path::Component::Normal(name) => Some(name),
            _ => None,
        }));
    }
    Ok(dir.join(LOG_FILE_NAME))
}

/// Install the global subscriber.
///
/// Environment variables override `config`, which overrides the defaults.
/// Fails if a global subscriber is already installed.
pub fn init_logging(
    config: Option<&LoggingConfig>,
    workspace: Option<&Path>,
) -> Result<(), ApiError> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);
    if !config.enabled {
        return Ok(());
    }

    let filter = env_filter(config)?;
    let format = env_override(ENV_FORMAT).unwrap_or(config.format);
    let output = match std::env::var(ENV_OUTPUT) {
        Ok(raw) => raw.parse()?,
        Err(_) => config.output,
    };
    let writer = make_writer(output, config.file.clone(), workspace)?;

    let layer = fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(writer);
    let registry = Registry::default().with(filter);
    let installed = match format {
        LogFormat::Json => registry.with(layer.json()).try_init(),
        LogFormat::Text => registry
            .with(layer.with_ansi(config.color && !output.writes_file()))
            .try_init(),
    };
    installed.map_err(|e| ApiError::ConfigError(format!("cannot install logger: {}", e)))
}

/// Parsed environment value; unset or unparseable falls back to the config
fn env_override<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|raw| raw.parse().ok())
}

fn make_writer(
    output: LogOutput,
    configured_file: Option<PathBuf>,
    workspace: Option<&Path>,
) -> Result<BoxMakeWriter, ApiError> {
    let writer = match output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::Both => BoxMakeWriter::new(std::io::stdout.and(std::io::stderr)),
        LogOutput::File | LogOutput::FileAndStderr => {
            let path = resolve_log_file_path(configured_file, workspace)?;
            let file = Mutex::new(open_log_file(&path)?);
            if output == LogOutput::FileAndStderr {
                BoxMakeWriter::new(file.and(std::io::stderr))
            } else {
                BoxMakeWriter::new(file)
            }
        }
    };
    Ok(writer)
}

fn open_log_file(path: &Path) -> Result<std::fs::File, ApiError> {
    let io_error = |e: std::io::Error| {
        ApiError::ConfigError(format!("cannot open log file {:?}: {}", path, e))
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_error)
}

/// `MODTREE_LOG` replaces the whole filter; otherwise the configured level
/// plus per-target directives from the config and `MODTREE_LOG_MODULES`.
fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, ApiError> {
    if let Ok(filter) = EnvFilter::try_from_env(ENV_FILTER) {
        return Ok(filter);
    }
    let level = parse_level(&config.level).map_err(ApiError::ConfigError)?;
    if level == LevelFilter::OFF {
        return Ok(EnvFilter::new("off"));
    }

    let mut directives: Vec<String> = config
        .modules
        .iter()
        .map(|(target, level)| format!("{}={}", target, level.trim()))
        .collect();
    if let Ok(raw) = std::env::var(ENV_MODULES) {
        directives.extend(parse_module_directives(&raw));
    }

    directives.into_iter().try_fold(
        EnvFilter::default().add_directive(level.into()),
        |filter, directive| {
            let parsed = directive.parse().map_err(|e| {
                ApiError::ConfigError(format!("invalid log directive {:?}: {}", directive, e))
            })?;
            Ok(filter.add_directive(parsed))
        },
    )
}

/// `a=debug, b=warn` → `["a=debug", "b=warn"]`; malformed entries are skipped
fn parse_module_directives(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|entry| {
            let (target, level) = entry.split_once('=')?;
            let (target, level) = (target.trim(), level.trim());
            (!target.is_empty() && !level.is_empty()).then(|| format!("{}={}", target, level))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_log_text_to_stderr() {
        let config = LoggingConfig::default();
        assert!(config.enabled);
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.output, LogOutput::Stderr);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_names() {
        for name in ["stdout", "stderr", "file", "file+stderr", "both"] {
            let output: LogOutput = name.parse().unwrap();
            assert_eq!(output.to_string(), name);
        }
        assert!("file+stderr".parse::<LogOutput>().unwrap().writes_file());
        assert!(!LogOutput::Both.writes_file());
        assert!("syslog".parse::<LogOutput>().is_err());
    }

    #[test]
    fn test_output_deserializes_from_config_names() {
        let output: LogOutput = serde_json::from_str("\"file+stderr\"").unwrap();
        assert_eq!(output, LogOutput::FileAndStderr);
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
    }

    #[test]
    fn test_bad_levels_fail_validation() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let mut config = LoggingConfig::default();
        config
            .modules
            .insert("modtree::annotation".to_string(), "verbose".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.contains("modtree::annotation"));

        let config = LoggingConfig {
            level: "off".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_module_directives() {
        assert_eq!(
            parse_module_directives("modtree::tree=debug, modtree::patch = warn,broken,=x"),
            vec!["modtree::tree=debug", "modtree::patch=warn"]
        );
    }

    #[test]
    fn test_configured_log_file_is_used() {
        let configured = PathBuf::from("/var/log/modtree/run.log");
        let path = resolve_log_file_path(Some(configured), None).unwrap();
        assert_eq!(path, PathBuf::from("/var/log/modtree/run.log"));
    }

    #[test]
    fn test_default_log_file_is_scoped_to_workspace() {
        let temp = tempfile::tempdir().unwrap();
        let path = resolve_log_file_path(None, Some(temp.path())).unwrap();
        assert!(path.ends_with(LOG_FILE_NAME));
        let name = temp.path().file_name().unwrap();
        assert!(path.components().any(|c| c.as_os_str() == name));
    }
}
