//! Incremental Patcher
//!
//! Carries annotations from a previously persisted tree into a freshly built
//! one. The fresh tree's structure always wins; an old annotation survives only
//! when a module with the same canonical path exists in both trees and its
//! fingerprint is unchanged.

use crate::annotation::Annotation;
use crate::tree::{Module, ModuleTree};
use crate::types::Fingerprint;
use std::collections::HashMap;
use tracing::{debug, info};

/// Counters for one patch call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchReport {
    /// Modules whose annotation was carried forward
    pub reused: usize,
    /// Modules present in both trees whose content changed
    pub invalidated: usize,
    /// Modules only present in the fresh tree
    pub added: usize,
    /// Modules only present in the previous tree
    pub dropped: usize,
}

struct Previous<'a> {
    fingerprint: Fingerprint,
    annotation: Option<&'a Annotation>,
}

pub struct IncrementalPatcher;

impl IncrementalPatcher {
    /// Seed `fresh` with every annotation from `previous` that is still valid.
    ///
    /// Annotations already present on `fresh` are left untouched.
    pub fn patch(previous: &ModuleTree, fresh: &mut ModuleTree) -> PatchReport {
        let mut known: HashMap<&str, Previous<'_>> = previous
            .root()
            .post_order()
            .into_iter()
            .map(|module| {
                (
                    module.path(),
                    Previous {
                        fingerprint: module.fingerprint(),
                        annotation: module.annotation(),
                    },
                )
            })
            .collect();

        let mut report = PatchReport::default();
        fresh
            .root_mut()
            .for_each_post_order_mut(&mut |module: &mut Module| {
                let Some(old) = known.remove(module.path()) else {
                    report.added += 1;
                    return;
                };
                if module.annotation().is_some() {
                    return;
                }

                let unchanged =
                    old.fingerprint == module.fingerprint() && !module.has_unreadable_files();
                match (unchanged, old.annotation) {
                    (true, Some(annotation)) => {
                        module.set_annotation(annotation.clone());
                        report.reused += 1;
                    }
                    (true, None) => {}
                    (false, _) => {
                        debug!(
                            module = %module.path(),
                            "Module content changed, annotation invalidated"
                        );
                        report.invalidated += 1;
                    }
                }
            });
        report.dropped = known.len();

        info!(
            reused = report.reused,
            invalidated = report.invalidated,
            added = report.added,
            dropped = report.dropped,
            "Patched module tree"
        );
        report
    }
}
