//! Module and file node types
//!
//! A module owns its child modules and files, so parent/child links can never
//! disagree: the parent of a node is the module whose `modules` vector holds
//! it. Aggregate weight and fingerprint are memoized per node and recomputed
//! from the current structure whenever a pass mutates that node.

use crate::annotation::Annotation;
use crate::tree::hasher::module_fingerprint;
use crate::types::{Fingerprint, Weight};
use chrono::{DateTime, Utc};
use std::sync::OnceLock;

/// Name of the root module
pub const ROOT_NAME: &str = ".";

/// File leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// Last path segment
    pub name: String,
    /// Path relative to the project root
    pub path: String,
    pub last_modified: DateTime<Utc>,
    pub weight: Weight,
    pub fingerprint: Fingerprint,
}

/// Folder-like grouping of files and sub-modules
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    path: String,
    modules: Vec<Module>,
    files: Vec<FileNode>,
    annotation: Option<Annotation>,
    aggregate_weight: OnceLock<Weight>,
    fingerprint: OnceLock<Fingerprint>,
}

impl Module {
    /// Create an empty module.
    ///
    /// `name` is the display name (possibly several collapsed segments) and
    /// `path` the module's directory relative to the project root.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            modules: Vec::new(),
            files: Vec::new(),
            annotation: None,
            aggregate_weight: OnceLock::new(),
            fingerprint: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical identity of the module
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn files(&self) -> &[FileNode] {
        &self.files
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    pub fn set_annotation(&mut self, annotation: Annotation) {
        self.annotation = Some(annotation);
    }

    pub fn clear_annotation(&mut self) -> Option<Annotation> {
        self.annotation.take()
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn file(&self, name: &str) -> Option<&FileNode> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Sum of the weights of the files this module owns directly
    pub fn own_weight(&self) -> Weight {
        self.files.iter().map(|f| f.weight).sum()
    }

    /// Own weight plus the aggregate weight of every child module
    pub fn aggregate_weight(&self) -> Weight {
        *self.aggregate_weight.get_or_init(|| {
            self.own_weight()
                + self
                    .modules
                    .iter()
                    .map(Module::aggregate_weight)
                    .sum::<Weight>()
        })
    }

    /// Digest over the files this module owns directly and the fingerprints
    /// of its child modules, so both content and partitioning are covered
    pub fn fingerprint(&self) -> Fingerprint {
        *self.fingerprint.get_or_init(|| {
            module_fingerprint(
                self.files.iter().map(|f| (f.path.as_str(), f.fingerprint)),
                self.modules.iter().map(|m| (m.path.as_str(), m.fingerprint())),
            )
        })
    }

    /// True if any file in this subtree could not be read during the build
    pub fn has_unreadable_files(&self) -> bool {
        self.files.iter().any(|f| f.fingerprint.is_unreadable())
            || self.modules.iter().any(Module::has_unreadable_files)
    }

    /// Modules of this subtree, children before parents
    pub fn post_order(&self) -> Vec<&Module> {
        let mut out = Vec::new();
        self.push_post_order(&mut out);
        out
    }

    fn push_post_order<'a>(&'a self, out: &mut Vec<&'a Module>) {
        for child in &self.modules {
            child.push_post_order(out);
        }
        out.push(self);
    }

    /// Mutable visit in the same order as [`Module::post_order`]
    pub fn for_each_post_order_mut(&mut self, f: &mut impl FnMut(&mut Module)) {
        for child in &mut self.modules {
            child.for_each_post_order_mut(f);
        }
        f(self);
    }

    /// Find a module in this subtree by canonical path
    pub fn find(&self, path: &str) -> Option<&Module> {
        if self.path == path {
            return Some(self);
        }
        self.modules.iter().find_map(|m| m.find(path))
    }

    pub fn module_count(&self) -> usize {
        1 + self.modules.iter().map(Module::module_count).sum::<usize>()
    }

    pub(crate) fn modules_mut(&mut self) -> &mut Vec<Module> {
        self.invalidate();
        &mut self.modules
    }

    pub(crate) fn files_mut(&mut self) -> &mut Vec<FileNode> {
        self.invalidate();
        &mut self.files
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_path(&mut self, path: String) {
        self.path = path;
    }

    /// Split into parts, leaving the module empty
    pub(crate) fn take_contents(&mut self) -> (Vec<Module>, Vec<FileNode>) {
        self.invalidate();
        (
            std::mem::take(&mut self.modules),
            std::mem::take(&mut self.files),
        )
    }

    /// Seed the fingerprint memo with a previously persisted value
    pub(crate) fn restore_fingerprint(&mut self, fingerprint: Fingerprint) {
        self.fingerprint = OnceLock::from(fingerprint);
    }

    fn invalidate(&mut self) {
        self.aggregate_weight = OnceLock::new();
        self.fingerprint = OnceLock::new();
    }
}

/// Rooted module tree. The root is named `.`, has an empty path, and is
/// never removed or renamed by any pass.
#[derive(Debug, Clone)]
pub struct ModuleTree {
    root: Module,
}

impl Default for ModuleTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleTree {
    pub fn new() -> Self {
        Self {
            root: Module::new(ROOT_NAME, ""),
        }
    }

    pub(crate) fn from_root(root: Module) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Module {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Module {
        &mut self.root
    }

    pub fn find(&self, path: &str) -> Option<&Module> {
        self.root.find(path)
    }

    pub fn module_count(&self) -> usize {
        self.root.module_count()
    }

    /// Number of modules carrying an annotation
    pub fn annotated_count(&self) -> usize {
        self.root
            .post_order()
            .into_iter()
            .filter(|m| m.annotation().is_some())
            .count()
    }
}
