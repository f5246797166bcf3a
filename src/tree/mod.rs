//! Module tree construction and restructuring
//!
//! Selected paths → [`ModuleTreeBuilder`] → [`collapse_folders`] →
//! [`BudgetRebalancer`]. All passes run sequentially and finish before any
//! annotation task observes the tree.

pub mod builder;
pub mod collapse;
pub mod hasher;
pub mod node;
pub mod rebalance;
pub mod source;
pub mod weight;

pub use builder::ModuleTreeBuilder;
pub use collapse::collapse_folders;
pub use node::{FileNode, Module, ModuleTree, ROOT_NAME};
pub use rebalance::{BudgetConfig, BudgetRebalancer, RebalanceReport};
pub use source::{DiskFs, MemoryFs, SourceFs, SourceMetadata};
pub use weight::{ByteMeasurer, SizeMeasurer, TokenMeasurer};
