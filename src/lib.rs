//! Modtree: size-aware module trees with bottom-up annotations
//!
//! Groups a project's files into a tree of modules, collapses trivial folder
//! chains, rebalances modules against a weight budget and annotates every
//! module through an external summarizer, children before parents. Stored
//! annotations are reused for modules whose content did not change.

pub mod annotation;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod patch;
pub mod store;
pub mod tree;
pub mod types;
pub mod workspace;

pub use annotation::{Annotation, AnnotationScheduler, Summarizer, SummaryRequest};
pub use config::{ConfigLoader, ModtreeConfig};
pub use error::{
    AnnotateError, AnnotationFailure, ApiError, StorageError, SummarizeError, TreeError,
};
pub use patch::{IncrementalPatcher, PatchReport};
pub use tree::{Module, ModuleTree, ModuleTreeBuilder};
pub use workspace::{UpdateOutcome, Workspace};
