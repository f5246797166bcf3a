//! Module Annotations
//!
//! Natural-language descriptions attached to modules, produced bottom-up by
//! the [`AnnotationScheduler`] through a [`Summarizer`] collaborator.

pub mod retry;
pub mod scheduler;
pub mod summarizer;

use serde::{Deserialize, Serialize};

pub use retry::RetryPolicy;
pub use scheduler::{AnnotationConfig, AnnotationReport, AnnotationScheduler, FailurePolicy};
pub use summarizer::{ChildAnnotation, FileContent, Summarizer, SummaryRequest};

/// Three-part description of a module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Context in which the module exists
    pub external: String,
    /// What lives inside the module
    pub internal: String,
    /// What the module exposes to other modules
    pub public: String,
}

impl Annotation {
    pub fn new(
        external: impl Into<String>,
        internal: impl Into<String>,
        public: impl Into<String>,
    ) -> Self {
        Self {
            external: external.into(),
            internal: internal.into(),
            public: public.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.external.is_empty() && self.internal.is_empty() && self.public.is_empty()
    }
}
