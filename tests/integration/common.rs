use async_trait::async_trait;
use modtree::tree::{ByteMeasurer, MemoryFs, ModuleTree, ModuleTreeBuilder};
use modtree::{Annotation, Module, SummarizeError, Summarizer, SummaryRequest};
use parking_lot::Mutex;

/// In-memory source where every file holds `weight` bytes
pub fn sized_source(files: &[(&str, usize)]) -> MemoryFs {
    MemoryFs::with_files(files.iter().map(|(path, weight)| (*path, vec![b'x'; *weight])))
}

pub fn build(source: &MemoryFs, paths: &[&str]) -> ModuleTree {
    ModuleTreeBuilder::new(source, &ByteMeasurer)
        .build(paths)
        .unwrap()
}

/// Names of the direct child modules, sorted
pub fn module_names(module: &Module) -> Vec<String> {
    let mut names: Vec<String> = module.modules().iter().map(|m| m.name().to_string()).collect();
    names.sort();
    names
}

/// Names of the files a module owns directly, sorted
pub fn file_names(module: &Module) -> Vec<String> {
    let mut names: Vec<String> = module.files().iter().map(|f| f.name.clone()).collect();
    names.sort();
    names
}

/// Summarizer recording the path of every module it was asked about
#[derive(Default)]
pub struct RecordingSummarizer {
    pub calls: Mutex<Vec<String>>,
}

impl RecordingSummarizer {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl Summarizer for RecordingSummarizer {
    async fn summarize(&self, request: SummaryRequest) -> Result<Annotation, SummarizeError> {
        self.calls.lock().push(request.module_path.clone());
        Ok(Annotation::new(
            format!("{} in context", request.module_name),
            format!("{} files", request.files.len()),
            format!("{} children", request.children.len()),
        ))
    }
}
