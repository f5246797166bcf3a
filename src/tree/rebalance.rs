//! Size-aware merging of undersized modules into their parents

use crate::tree::node::{Module, ModuleTree};
use crate::types::Weight;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_MIN_WEIGHT: Weight = 1_000;
pub const DEFAULT_MAX_WEIGHT: Weight = 100_000;

/// Merge thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// A child whose aggregate weight is below this is a merge candidate
    #[serde(default = "default_min_weight")]
    pub min_weight: Weight,

    /// A parent's direct weight may not exceed this after absorbing a child
    #[serde(default = "default_max_weight")]
    pub max_weight: Weight,
}

fn default_min_weight() -> Weight {
    DEFAULT_MIN_WEIGHT
}

fn default_max_weight() -> Weight {
    DEFAULT_MAX_WEIGHT
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            min_weight: DEFAULT_MIN_WEIGHT,
            max_weight: DEFAULT_MAX_WEIGHT,
        }
    }
}

impl BudgetConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_weight >= self.max_weight {
            return Err(format!(
                "budget.min_weight ({}) must be lower than budget.max_weight ({})",
                self.min_weight, self.max_weight
            ));
        }
        Ok(())
    }
}

/// Outcome counters for one rebalance pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebalanceReport {
    pub merged: usize,
    pub rejected: usize,
}

/// Single bottom-up pass merging small child modules into their parent.
///
/// Candidates are evaluated in child order. The result is deterministic for a
/// fixed input order but is not a global optimum.
pub struct BudgetRebalancer {
    config: BudgetConfig,
}

impl BudgetRebalancer {
    pub fn new(config: BudgetConfig) -> Self {
        Self { config }
    }

    pub fn rebalance(&self, tree: &mut ModuleTree) -> RebalanceReport {
        let mut report = RebalanceReport::default();
        self.rebalance_module(tree.root_mut(), &mut report);
        debug!(
            merged = report.merged,
            rejected = report.rejected,
            "Rebalanced module tree"
        );
        report
    }

    fn rebalance_module(&self, module: &mut Module, report: &mut RebalanceReport) {
        for child in module.modules_mut() {
            self.rebalance_module(child, report);
        }
        self.merge_small_children(module, report);
    }

    /// Scan the direct children of `module` once, folding in candidates that fit
    fn merge_small_children(&self, module: &mut Module, report: &mut RebalanceReport) {
        let mut direct_weight = module.own_weight();
        let mut i = 0;
        while i < module.modules().len() {
            let candidate = &module.modules()[i];
            let weight = candidate.aggregate_weight();
            if weight >= self.config.min_weight {
                i += 1;
                continue;
            }
            if direct_weight + weight > self.config.max_weight {
                debug!(
                    module = %module.path(),
                    candidate = %candidate.path(),
                    direct_weight,
                    weight,
                    "Merge rejected, parent would exceed budget"
                );
                report.rejected += 1;
                i += 1;
                continue;
            }

            let mut merged = module.modules_mut().remove(i);
            debug!(
                module = %module.path(),
                candidate = %merged.path(),
                direct_weight,
                weight,
                "Merging module into parent"
            );
            let prefix = merged.name().to_string();
            let (hoisted, files) = merged.take_contents();
            module.files_mut().extend(files.into_iter().map(|mut file| {
                file.name = format!("{}/{}", prefix, file.name);
                file
            }));
            // hoisted modules take the merged child's slot, where the scan resumes
            let hoisted: Vec<Module> = hoisted
                .into_iter()
                .map(|mut child| {
                    child.set_name(format!("{}/{}", prefix, child.name()));
                    child
                })
                .collect();
            module.modules_mut().splice(i..i, hoisted);
            direct_weight += weight;
            report.merged += 1;
        }
    }
}
