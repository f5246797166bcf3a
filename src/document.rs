//! Persisted tree document
//!
//! Serializable mirror of a [`ModuleTree`]. Field names follow the on-disk
//! format (`lastModified` for files); everything else is snake case.

use crate::annotation::Annotation;
use crate::error::StorageError;
use crate::tree::{FileNode, Module, ModuleTree, ROOT_NAME};
use crate::types::{Fingerprint, Weight};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Top-level document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    /// Always `.`
    pub root: String,
    pub modules: ModuleRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub name: String,
    pub path: String,
    pub fingerprint: Fingerprint,
    #[serde(default)]
    pub children: Vec<ModuleRecord>,
    #[serde(default)]
    pub files: Vec<FileRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub path: String,
    #[serde(rename = "lastModified")]
    pub last_modified: DateTime<Utc>,
    pub weight: Weight,
    pub fingerprint: Fingerprint,
}

impl MetadataDocument {
    pub fn from_tree(tree: &ModuleTree) -> Self {
        Self {
            root: ROOT_NAME.to_string(),
            modules: ModuleRecord::from_module(tree.root()),
        }
    }

    /// Rebuild the tree, seeding every module with its stored fingerprint
    pub fn into_tree(self) -> Result<ModuleTree, StorageError> {
        if self.root != ROOT_NAME {
            return Err(StorageError::InvalidDocument(format!(
                "root must be {:?}, found {:?}",
                ROOT_NAME, self.root
            )));
        }
        if !self.modules.path.is_empty() {
            return Err(StorageError::InvalidDocument(format!(
                "root module must have an empty path, found {:?}",
                self.modules.path
            )));
        }
        Ok(ModuleTree::from_root(self.modules.into_module()?))
    }
}

impl ModuleRecord {
    fn from_module(module: &Module) -> Self {
        Self {
            name: module.name().to_string(),
            path: module.path().to_string(),
            fingerprint: module.fingerprint(),
            children: module.modules().iter().map(Self::from_module).collect(),
            files: module.files().iter().map(FileRecord::from).collect(),
            annotation: module.annotation().cloned(),
        }
    }

    /// First sibling name used twice among this record's entries
    fn first_duplicate(&self) -> Option<String> {
        let mut names = HashSet::new();
        self.children
            .iter()
            .map(|c| c.name.as_str())
            .chain(self.files.iter().map(|f| f.name.as_str()))
            .find(|name| !names.insert(*name))
            .map(str::to_string)
    }

    fn into_module(self) -> Result<Module, StorageError> {
        if let Some(name) = self.first_duplicate() {
            return Err(StorageError::InvalidDocument(format!(
                "duplicate entry {:?} in module {:?}",
                name, self.path
            )));
        }

        let mut module = Module::new(self.name, self.path);
        let children = self
            .children
            .into_iter()
            .map(ModuleRecord::into_module)
            .collect::<Result<Vec<_>, _>>()?;
        module.modules_mut().extend(children);
        module
            .files_mut()
            .extend(self.files.into_iter().map(FileNode::from));
        if let Some(annotation) = self.annotation {
            module.set_annotation(annotation);
        }
        module.restore_fingerprint(self.fingerprint);
        Ok(module)
    }
}

impl From<&FileNode> for FileRecord {
    fn from(file: &FileNode) -> Self {
        Self {
            name: file.name.clone(),
            path: file.path.clone(),
            last_modified: file.last_modified,
            weight: file.weight,
            fingerprint: file.fingerprint,
        }
    }
}

impl From<FileRecord> for FileNode {
    fn from(record: FileRecord) -> Self {
        Self {
            name: record.name,
            path: record.path,
            last_modified: record.last_modified,
            weight: record.weight,
            fingerprint: record.fingerprint,
        }
    }
}
