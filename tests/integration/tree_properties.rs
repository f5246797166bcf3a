//! Structural invariants over generated file sets

use crate::common::sized_source;
use modtree::tree::{
    collapse_folders, BudgetConfig, BudgetRebalancer, ByteMeasurer, MemoryFs, ModuleTree,
    ModuleTreeBuilder,
};
use modtree::types::Weight;
use modtree::Module;
use proptest::prelude::*;

const MIN: Weight = 1_000;
const MAX: Weight = 5_000;

fn file_set() -> impl Strategy<Value = Vec<(String, usize)>> {
    prop::collection::vec(
        (
            prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 0..4),
            prop::sample::select(vec!["x.rs", "y.rs", "z.rs"]),
            0usize..3_000,
        ),
        1..24,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(mut parts, file, size)| {
                parts.push(file);
                (parts.join("/"), size)
            })
            .collect()
    })
}

fn source_for(files: &[(String, usize)]) -> MemoryFs {
    let borrowed: Vec<(&str, usize)> = files.iter().map(|(p, s)| (p.as_str(), *s)).collect();
    sized_source(&borrowed)
}

fn pipeline(source: &MemoryFs, files: &[(String, usize)]) -> ModuleTree {
    let paths: Vec<&str> = files.iter().map(|(p, _)| p.as_str()).collect();
    let mut tree = ModuleTreeBuilder::new(source, &ByteMeasurer)
        .build(&paths)
        .unwrap();
    collapse_folders(&mut tree);
    BudgetRebalancer::new(BudgetConfig {
        min_weight: MIN,
        max_weight: MAX,
    })
    .rebalance(&mut tree);
    tree
}

/// Comparable outline: (name, path, files with weights, children)
#[derive(Debug, PartialEq, Eq)]
struct Shape {
    name: String,
    path: String,
    files: Vec<(String, Weight)>,
    children: Vec<Shape>,
}

fn shape(module: &Module) -> Shape {
    Shape {
        name: module.name().to_string(),
        path: module.path().to_string(),
        files: module.files().iter().map(|f| (f.name.clone(), f.weight)).collect(),
        children: module.modules().iter().map(shape).collect(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_collapse_leaves_no_single_child_chains(files in file_set()) {
        let source = source_for(&files);
        let paths: Vec<&str> = files.iter().map(|(p, _)| p.as_str()).collect();
        let mut tree = ModuleTreeBuilder::new(&source, &ByteMeasurer).build(&paths).unwrap();
        let total = tree.root().aggregate_weight();
        collapse_folders(&mut tree);

        prop_assert_eq!(tree.root().aggregate_weight(), total);
        for module in tree.root().post_order() {
            if module.path().is_empty() {
                continue;
            }
            prop_assert!(
                !(module.files().is_empty() && module.modules().len() == 1),
                "{} still has a single child and no files", module.path()
            );
        }
    }

    #[test]
    fn prop_aggregate_weight_is_own_plus_children(files in file_set()) {
        let source = source_for(&files);
        let tree = pipeline(&source, &files);
        for module in tree.root().post_order() {
            let children: Weight = module.modules().iter().map(Module::aggregate_weight).sum();
            prop_assert_eq!(module.aggregate_weight(), module.own_weight() + children);
        }
    }

    #[test]
    fn prop_remaining_small_children_did_not_fit(files in file_set()) {
        let source = source_for(&files);
        let tree = pipeline(&source, &files);
        for module in tree.root().post_order() {
            for child in module.modules() {
                if child.aggregate_weight() < MIN {
                    prop_assert!(
                        module.own_weight() + child.aggregate_weight() > MAX,
                        "{} could have absorbed {}", module.path(), child.path()
                    );
                }
            }
        }
    }

    #[test]
    fn prop_rebuild_is_idempotent(files in file_set()) {
        let source = source_for(&files);
        let first = pipeline(&source, &files);
        let second = pipeline(&source, &files);
        prop_assert_eq!(shape(first.root()), shape(second.root()));
        prop_assert_eq!(first.root().fingerprint(), second.root().fingerprint());
    }
}
