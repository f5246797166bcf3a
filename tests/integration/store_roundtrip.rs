//! On-disk workspaces and metadata documents

use crate::common::RecordingSummarizer;
use modtree::document::MetadataDocument;
use modtree::store::{FileStore, MetadataStore};
use modtree::{ApiError, StorageError, Workspace};
use std::fs;
use std::path::Path;
use std::sync::Arc;

const FILES: [&str; 3] = ["src/lib.rs", "src/tree/node.rs", "docs/guide.md"];

fn write_project(root: &Path) {
    for path in FILES {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, format!("// {}\n", path)).unwrap();
    }
}

#[tokio::test]
async fn test_disk_workspace_persists_and_reuses_annotations() {
    let temp = tempfile::tempdir().unwrap();
    write_project(temp.path());
    let summarizer = Arc::new(RecordingSummarizer::default());

    let workspace = Workspace::open(temp.path(), summarizer.clone()).unwrap();
    let first = workspace.create(&FILES).await.unwrap();
    assert!(temp.path().join(".modtree/metadata.yaml").is_file());
    assert!(first.annotation.calls > 0);

    let err = workspace.create(&FILES).await.unwrap_err();
    assert!(matches!(err, ApiError::StorageError(StorageError::AlreadyExists(_))));

    summarizer.reset();
    let reopened = Workspace::open(temp.path(), summarizer.clone()).unwrap();
    let second = reopened.update(&FILES).await.unwrap();
    assert!(summarizer.calls().is_empty());
    assert_eq!(second.tree.annotated_count(), second.tree.module_count());

    assert!(reopened.remove().unwrap());
    assert!(reopened.load().unwrap().is_none());
}

#[tokio::test]
async fn test_workspace_config_selects_json_document() {
    let temp = tempfile::tempdir().unwrap();
    write_project(temp.path());
    fs::create_dir_all(temp.path().join(".modtree")).unwrap();
    fs::write(
        temp.path().join(".modtree/config.toml"),
        "[storage]\nmetadata_path = \"out/tree.json\"\n",
    )
    .unwrap();

    let workspace = Workspace::open(temp.path(), Arc::new(RecordingSummarizer::default())).unwrap();
    workspace.update(&FILES).await.unwrap();

    let text = fs::read_to_string(temp.path().join("out/tree.json")).unwrap();
    let document: MetadataDocument = serde_json::from_str(&text).unwrap();
    assert_eq!(document.root, ".");
    assert!(document.modules.annotation.is_some());
}

#[test]
fn test_stored_document_restores_tree() {
    let temp = tempfile::tempdir().unwrap();
    write_project(temp.path());
    let source = modtree::tree::DiskFs::new(temp.path()).unwrap();
    let tree = modtree::ModuleTreeBuilder::new(&source, &modtree::tree::ByteMeasurer)
        .build(&FILES)
        .unwrap();

    let store = FileStore::new(temp.path().join("meta.yaml"));
    store.save(&MetadataDocument::from_tree(&tree)).unwrap();
    let restored = store.load().unwrap().unwrap().into_tree().unwrap();

    assert_eq!(restored.module_count(), tree.module_count());
    assert_eq!(restored.root().fingerprint(), tree.root().fingerprint());
    let node = restored.find("src/tree").unwrap();
    assert_eq!(node.files()[0].path, "src/tree/node.rs");
    assert_eq!(node.files()[0].weight, tree.find("src/tree").unwrap().files()[0].weight);
}
