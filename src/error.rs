//! Error types
//!
//! One enum per domain. Structural tree errors are fatal to a build; annotation
//! errors are recorded per module; storage errors cover the persisted document.

use crate::annotation::AnnotationReport;
use std::time::Duration;
use thiserror::Error;

/// Structural errors raised while building a module tree
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("failed to stat path {path:?}: {source}")]
    PathResolution {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("path {path:?} conflicts with existing {existing}")]
    ParentConflict { path: String, existing: String },

    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },
}

/// Failure reported by the summarization collaborator
#[derive(Debug, Clone, Error)]
pub enum SummarizeError {
    #[error("rate limited by summarization service")]
    RateLimited { retry_after: Option<Duration> },

    #[error("summarization failed: {0}")]
    Failed(String),
}

impl SummarizeError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, SummarizeError::RateLimited { .. })
    }
}

/// Per-module annotation error
#[derive(Debug, Clone, Error)]
pub enum AnnotateError {
    #[error("failed to create annotation for module {module:?}: {source}")]
    Summarize {
        module: String,
        #[source]
        source: SummarizeError,
    },

    #[error("module {module:?} not annotated because child {dependency:?} failed")]
    DependencyFailed { module: String, dependency: String },

    #[error("failed to read {path:?} for module {module:?}: {message}")]
    Content {
        module: String,
        path: String,
        message: String,
    },

    #[error("annotation of module {module:?} was cancelled")]
    Cancelled { module: String },

    #[error("annotation task for module {module:?} panicked")]
    TaskPanicked { module: String },
}

impl AnnotateError {
    pub fn module(&self) -> &str {
        match self {
            AnnotateError::Summarize { module, .. }
            | AnnotateError::DependencyFailed { module, .. }
            | AnnotateError::Content { module, .. }
            | AnnotateError::Cancelled { module }
            | AnnotateError::TaskPanicked { module } => module,
        }
    }

    /// Whether this failure only mirrors a failure further down the tree
    pub fn is_propagated(&self) -> bool {
        matches!(
            self,
            AnnotateError::DependencyFailed { .. } | AnnotateError::Cancelled { .. }
        )
    }
}

/// Overall scheduler failure: the surfaced error plus every failed module
#[derive(Debug, Error)]
#[error("{first} ({} module(s) failed)", failed.len())]
pub struct AnnotationFailure {
    /// First failure in post-order that did not merely mirror another one
    pub first: AnnotateError,
    pub failed: Vec<AnnotateError>,
    /// Counters of the run, successes included
    pub report: AnnotationReport,
}

impl AnnotationFailure {
    pub fn failed_modules(&self) -> Vec<&str> {
        self.failed.iter().map(AnnotateError::module).collect()
    }
}

/// Persisted document errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path:?}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("metadata already exists at {0:?}; remove it or run an update instead")]
    AlreadyExists(String),

    #[error("invalid metadata document: {0}")]
    InvalidDocument(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Annotation(#[from] AnnotationFailure),

    #[error(transparent)]
    StorageError(#[from] StorageError),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
