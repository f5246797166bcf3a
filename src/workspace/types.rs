//! Shared types for workspace operations.

use crate::annotation::AnnotationReport;
use crate::patch::PatchReport;
use crate::tree::ModuleTree;

/// Result of a successful update: the persisted tree and what it took to get there.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub tree: ModuleTree,
    /// Empty when no previous document was stored
    pub patch: PatchReport,
    pub annotation: AnnotationReport,
}
