//! Workspace domain: the end-to-end pipeline from selected paths to a
//! persisted, annotated module tree.

mod facade;
mod types;

pub use facade::Workspace;
pub use types::UpdateOutcome;
