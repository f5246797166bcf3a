//! Build, collapse and rebalance on concrete layouts

use crate::common::{build, file_names, module_names, sized_source};
use modtree::tree::{collapse_folders, BudgetConfig, BudgetRebalancer};

#[test]
fn test_collapsing_mixed_layout() {
    let paths = [
        "dir1/file1.txt",
        "dir1/dir2/file2.go",
        "dir3/dir4/dir5/file3.txt",
        "dir3/dir4/dir5/file4.txt",
        "dir3/file5.md",
    ];
    let source = sized_source(&paths.map(|p| (p, 10)));
    let mut tree = build(&source, &paths);
    collapse_folders(&mut tree);

    let root = tree.root();
    assert_eq!(root.name(), ".");
    assert_eq!(module_names(root), vec!["dir1", "dir3"]);

    let dir1 = root.module("dir1").unwrap();
    assert_eq!(module_names(dir1), vec!["dir2"]);
    assert_eq!(file_names(dir1), vec!["file1.txt"]);
    assert_eq!(file_names(dir1.module("dir2").unwrap()), vec!["file2.go"]);

    let dir3 = root.module("dir3").unwrap();
    assert_eq!(module_names(dir3), vec!["dir4/dir5"]);
    assert_eq!(file_names(dir3), vec!["file5.md"]);
    let collapsed = dir3.module("dir4/dir5").unwrap();
    assert_eq!(collapsed.path(), "dir3/dir4/dir5");
    assert_eq!(file_names(collapsed), vec!["file3.txt", "file4.txt"]);
    assert_eq!(root.aggregate_weight(), 50);
}

#[test]
fn test_deep_single_file_collapses_to_one_module() {
    let source = sized_source(&[("dirA/dirB/dirC/fileA.txt", 1)]);
    let mut tree = build(&source, &["dirA/dirB/dirC/fileA.txt"]);
    collapse_folders(&mut tree);

    let root = tree.root();
    assert_eq!(module_names(root), vec!["dirA/dirB/dirC"]);
    assert_eq!(
        file_names(root.module("dirA/dirB/dirC").unwrap()),
        vec!["fileA.txt"]
    );
    assert!(root.files().is_empty());
}

fn budget_layout(parent_weight: usize) -> modtree::ModuleTree {
    let files = [("parent/big.txt", parent_weight), ("parent/child/small.txt", 200)];
    let source = sized_source(&files);
    let mut tree = build(&source, &files.map(|(p, _)| p));
    collapse_folders(&mut tree);
    BudgetRebalancer::new(BudgetConfig {
        min_weight: 1_000,
        max_weight: 100_000,
    })
    .rebalance(&mut tree);
    tree
}

#[test]
fn test_small_child_merged_when_parent_has_room() {
    let tree = budget_layout(99_000);
    let parent = tree.root().module("parent").unwrap();
    assert!(parent.modules().is_empty());
    assert_eq!(file_names(parent), vec!["big.txt", "child/small.txt"]);
    assert_eq!(parent.own_weight(), 99_200);
}

#[test]
fn test_small_child_kept_when_parent_is_full() {
    let tree = budget_layout(99_950);
    let parent = tree.root().module("parent").unwrap();
    assert_eq!(module_names(parent), vec!["child"]);
    assert_eq!(parent.own_weight(), 99_950);
    assert_eq!(parent.aggregate_weight(), 100_150);
}

#[test]
fn test_directories_in_input_are_ignored() {
    let source = sized_source(&[("src/lib.rs", 5)]);
    let tree = build(&source, &["src", "src/lib.rs", "."]);
    assert_eq!(tree.module_count(), 2);
    assert_eq!(file_names(tree.root().module("src").unwrap()), vec!["lib.rs"]);
}
