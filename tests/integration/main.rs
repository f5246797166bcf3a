//! Integration tests for module tree construction, annotation and persistence

mod common;
mod incremental_updates;
mod store_roundtrip;
mod tree_properties;
mod tree_structure;
