//! Removal of single-child folder chains

use crate::tree::node::{Module, ModuleTree};
use tracing::debug;

/// Collapse every non-root module that has exactly one child module and no
/// files of its own into that child, joining their names (`dir4` + `dir5`
/// becomes `dir4/dir5`).
///
/// Children are processed before their parent, so a chain of any depth ends
/// up as a single module after one pass. The root is never collapsed.
pub fn collapse_folders(tree: &mut ModuleTree) {
    let mut collapsed = 0usize;
    for child in tree.root_mut().modules_mut() {
        collapse_module(child, &mut collapsed);
    }
    debug!(collapsed, "Collapsed single-child folders");
}

fn collapse_module(module: &mut Module, collapsed: &mut usize) {
    for child in module.modules_mut() {
        collapse_module(child, collapsed);
    }

    while module.files().is_empty() && module.modules().len() == 1 {
        let (mut children, _) = module.take_contents();
        let Some(mut only) = children.pop() else {
            break;
        };
        let (grandchildren, files) = only.take_contents();

        let name = format!("{}/{}", module.name(), only.name());
        debug!(from = %module.path(), to = %only.path(), name = %name, "Collapsing folder");
        module.set_name(name);
        module.set_path(only.path().to_string());
        module.modules_mut().extend(grandchildren);
        module.files_mut().extend(files);
        *collapsed += 1;
    }
}
