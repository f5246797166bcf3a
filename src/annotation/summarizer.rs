//! Summarization collaborator contract

use crate::annotation::Annotation;
use crate::error::SummarizeError;
use async_trait::async_trait;

/// Content of a file owned directly by the module being summarized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub path: String,
    pub content: String,
}

/// Finished annotation of a child module, passed as context to its parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildAnnotation {
    pub name: String,
    pub path: String,
    pub annotation: Annotation,
}

/// Everything the summarizer gets to see for one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub module_name: String,
    pub module_path: String,
    pub files: Vec<FileContent>,
    pub children: Vec<ChildAnnotation>,
}

/// External service turning a module's content into an [`Annotation`].
///
/// Implementations signal throttling with [`SummarizeError::RateLimited`]; the
/// scheduler retries only that case.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, request: SummaryRequest) -> Result<Annotation, SummarizeError>;
}
