//! Module tree construction from a flat list of selected file paths

use crate::error::TreeError;
use crate::tree::hasher::file_fingerprint;
use crate::tree::node::{FileNode, Module, ModuleTree};
use crate::tree::source::SourceFs;
use crate::tree::weight::SizeMeasurer;
use crate::types::{Fingerprint, Weight};
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

/// Builds the raw directory-shaped module tree.
///
/// The result still contains single-child folder chains and undersized
/// modules; run [`crate::tree::collapse_folders`] and
/// [`crate::tree::BudgetRebalancer`] on it afterwards.
pub struct ModuleTreeBuilder<'a> {
    source: &'a dyn SourceFs,
    measurer: &'a dyn SizeMeasurer,
}

impl<'a> ModuleTreeBuilder<'a> {
    pub fn new(source: &'a dyn SourceFs, measurer: &'a dyn SizeMeasurer) -> Self {
        Self { source, measurer }
    }

    /// Build a tree from relative paths. Directory entries are skipped.
    pub fn build<S: AsRef<str>>(&self, paths: &[S]) -> Result<ModuleTree, TreeError> {
        let mut tree = ModuleTree::new();
        let mut file_count = 0usize;

        for entry in paths {
            let entry = entry.as_ref();
            let raw = split_path(entry)?;
            if raw.is_empty() {
                continue;
            }

            let metadata = self
                .source
                .stat(entry)
                .map_err(|source| TreeError::PathResolution {
                    path: entry.to_string(),
                    source,
                })?;
            if metadata.is_dir {
                continue;
            }

            let keys: Vec<String> = raw.iter().map(|s| s.nfc().collect()).collect();
            let (file_name, parents) = keys
                .split_last()
                .ok_or_else(|| TreeError::InvalidPath {
                    path: entry.to_string(),
                    reason: "empty path".to_string(),
                })?;
            let parent = find_or_create_parent(tree.root_mut(), parents)?;

            if parent.module(file_name).is_some() {
                return Err(TreeError::ParentConflict {
                    path: entry.to_string(),
                    existing: format!("module {:?}", join(parents, file_name)),
                });
            }
            // file I/O keeps the caller's spelling; only lookups use the NFC key
            let rel_path = raw.join("/");
            if let Some(existing) = parent.file(file_name) {
                if existing.path == rel_path {
                    debug!(path = %entry, "Skipping duplicate path");
                    continue;
                }
                return Err(TreeError::ParentConflict {
                    path: entry.to_string(),
                    existing: format!("file {:?}", existing.path),
                });
            }

            let (weight, fingerprint) = self.measure(&rel_path);
            parent.files_mut().push(FileNode {
                name: file_name.clone(),
                path: rel_path,
                last_modified: metadata.modified,
                weight,
                fingerprint,
            });
            file_count += 1;
        }

        debug!(
            files = file_count,
            modules = tree.module_count(),
            "Built module tree"
        );
        Ok(tree)
    }

    /// Read a file once for weight and fingerprint, degrading on read errors
    fn measure(&self, path: &str) -> (Weight, Fingerprint) {
        match self.source.read(path) {
            Ok(content) => (self.measurer.measure(&content), file_fingerprint(&content)),
            Err(e) => {
                warn!(path = %path, error = %e, "Unreadable file, weight degraded to zero");
                (0, Fingerprint::UNREADABLE)
            }
        }
    }
}

/// Split a relative path into its segments, dropping empty and `.` ones
fn split_path(path: &str) -> Result<Vec<&str>, TreeError> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(TreeError::InvalidPath {
                    path: path.to_string(),
                    reason: "parent directory segments are not allowed".to_string(),
                })
            }
            s => segments.push(s),
        }
    }
    Ok(segments)
}

fn join(parents: &[String], name: &str) -> String {
    if parents.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parents.join("/"), name)
    }
}

/// Walk down from `root`, creating every missing ancestor module
fn find_or_create_parent<'m>(
    root: &'m mut Module,
    parents: &[String],
) -> Result<&'m mut Module, TreeError> {
    let mut current = root;
    for (depth, segment) in parents.iter().enumerate() {
        let path = parents[..=depth].join("/");
        if current.file(segment).is_some() {
            return Err(TreeError::ParentConflict {
                path: path.clone(),
                existing: format!("file {:?}", path),
            });
        }
        let index = match current.modules().iter().position(|m| m.name() == segment) {
            Some(index) => index,
            None => {
                current.modules_mut().push(Module::new(segment.clone(), path));
                current.modules().len() - 1
            }
        };
        current = &mut current.modules_mut()[index];
    }
    Ok(current)
}
