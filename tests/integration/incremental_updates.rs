//! Reuse of stored annotations across runs

use crate::common::RecordingSummarizer;
use modtree::store::MemoryStore;
use modtree::tree::{BudgetConfig, ByteMeasurer, MemoryFs};
use modtree::{ModtreeConfig, Workspace};
use std::collections::BTreeSet;
use std::sync::Arc;

const FILES: [&str; 7] = [
    "README.md",
    "app/main.rs",
    "app/cli/args.rs",
    "app/cli/help.rs",
    "lib/mod.rs",
    "lib/core/a.rs",
    "lib/util/b.rs",
];

struct Harness {
    source: Arc<MemoryFs>,
    summarizer: Arc<RecordingSummarizer>,
    workspace: Workspace,
}

/// Workspace whose budget never merges anything, so every folder stays a module
fn harness() -> Harness {
    let source = Arc::new(MemoryFs::with_files(
        FILES.iter().map(|path| (*path, format!("contents of {}", path))),
    ));
    let summarizer = Arc::new(RecordingSummarizer::default());
    let config = ModtreeConfig {
        budget: BudgetConfig {
            min_weight: 1,
            max_weight: 2,
        },
        ..Default::default()
    };
    let workspace = Workspace::new(
        source.clone(),
        Arc::new(ByteMeasurer),
        summarizer.clone(),
        Arc::new(MemoryStore::new()),
        &config,
    )
    .unwrap();
    Harness {
        source,
        summarizer,
        workspace,
    }
}

fn called(summarizer: &RecordingSummarizer) -> BTreeSet<String> {
    summarizer.calls().into_iter().collect()
}

fn set(paths: &[&str]) -> BTreeSet<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

#[tokio::test]
async fn test_unchanged_rerun_makes_no_calls() {
    let h = harness();
    let first = h.workspace.update(&FILES).await.unwrap();
    assert_eq!(first.tree.module_count(), 6);
    assert_eq!(first.annotation.calls, 6);

    h.summarizer.reset();
    let second = h.workspace.update(&FILES).await.unwrap();
    assert!(h.summarizer.calls().is_empty());
    assert_eq!(second.annotation.reused, 6);
    assert_eq!(second.patch.reused, 6);
    assert_eq!(second.tree.annotated_count(), 6);
}

#[tokio::test]
async fn test_one_changed_file_reannotates_its_ancestry_only() {
    let h = harness();
    let first = h.workspace.update(&FILES).await.unwrap();
    h.summarizer.reset();

    h.source.insert("app/cli/args.rs", "fn parse() {}");
    let second = h.workspace.update(&FILES).await.unwrap();

    assert_eq!(called(&h.summarizer), set(&["", "app", "app/cli"]));
    assert_eq!(second.patch.invalidated, 3);
    for untouched in ["lib", "lib/core", "lib/util"] {
        assert_eq!(
            second.tree.find(untouched).unwrap().annotation(),
            first.tree.find(untouched).unwrap().annotation()
        );
    }
}

#[tokio::test]
async fn test_added_and_removed_files() {
    let h = harness();
    h.workspace.update(&FILES).await.unwrap();
    h.summarizer.reset();

    h.source.insert("lib/util/c.rs", "pub fn c() {}");
    let mut paths = FILES.to_vec();
    paths.push("lib/util/c.rs");
    paths.retain(|p| *p != "lib/core/a.rs");

    let outcome = h.workspace.update(&paths).await.unwrap();
    assert_eq!(outcome.patch.dropped, 1);
    assert!(outcome.tree.find("lib/core").is_none());
    assert_eq!(called(&h.summarizer), set(&["", "lib", "lib/util"]));
}

#[tokio::test]
async fn test_parents_are_summarized_after_their_children() {
    let h = harness();
    let outcome = h.workspace.update(&FILES).await.unwrap();
    let calls = h.summarizer.calls();
    let position = |path: &str| calls.iter().position(|c| c == path).unwrap();

    for module in outcome.tree.root().post_order() {
        for child in module.modules() {
            assert!(position(child.path()) < position(module.path()));
        }
    }
}

#[tokio::test]
async fn test_budget_change_reannotates_reshaped_modules() {
    let h = harness();
    let store = Arc::new(MemoryStore::new());
    let split = Workspace::new(
        h.source.clone(),
        Arc::new(ByteMeasurer),
        h.summarizer.clone(),
        store.clone(),
        &ModtreeConfig {
            budget: BudgetConfig {
                min_weight: 1,
                max_weight: 2,
            },
            ..Default::default()
        },
    )
    .unwrap();
    split.update(&FILES).await.unwrap();
    h.summarizer.reset();

    // default budget folds everything into the root
    let merged = Workspace::new(
        h.source.clone(),
        Arc::new(ByteMeasurer),
        h.summarizer.clone(),
        store,
        &ModtreeConfig::default(),
    )
    .unwrap();
    let outcome = merged.update(&FILES).await.unwrap();

    assert_eq!(outcome.tree.module_count(), 1);
    assert_eq!(outcome.patch.reused, 0);
    assert_eq!(called(&h.summarizer), set(&[""]));
    let root = outcome.tree.root().annotation().unwrap();
    assert_eq!(root.public, "0 children");
}
