use std::collections::{HashMap, HashSet};

use statree_protocol::SharedStr;

use crate::model::{BUILTIN_DISPLAY, BUILTIN_FILE, GroupNode, Node, NodeId, NodeStore, split_path};

use super::finalize;

/// Display name of the location hierarchy's root.
pub const SEARCH_PATH_ROOT: &str = "<search path>";

/// Group every function by directory and file instead of by caller.
///
/// Adds one group per directory and per `(directory, file)` pair to `store`
/// and returns the root group. Each directory is nested under the closest
/// enclosing directory that also holds profiled code, or under the root.
/// All groups are `local_only`: a directory's time is the local time of the
/// functions below it, so nested calls are not counted twice.
///
/// The call graph itself is left as it is: functions gain no parents.
pub fn build_location_tree(store: &mut NodeStore) -> NodeId {
    let root = store.insert_group(GroupNode::new("/", "", SEARCH_PATH_ROOT, true));

    let functions: Vec<(NodeId, SharedStr, SharedStr)> = store
        .leaves()
        .map(|(id, n)| (id, n.directory.clone(), n.filename.clone()))
        .collect();

    let mut directories: HashMap<SharedStr, NodeId> = HashMap::new();
    let mut directory_order: Vec<SharedStr> = Vec::new();
    let mut files: HashMap<(SharedStr, SharedStr), NodeId> = HashMap::new();

    for (function, directory, filename) in functions {
        let directory_group = match directories.get(&directory) {
            Some(&group) => group,
            None => {
                let group = if directory.is_empty() {
                    root
                } else {
                    let name = directory.clone();
                    store.insert_group(GroupNode::new(directory.clone(), "", name, true))
                };
                directories.insert(directory.clone(), group);
                directory_order.push(directory.clone());
                group
            }
        };

        let filename = if filename == BUILTIN_FILE {
            SharedStr::from(BUILTIN_DISPLAY)
        } else {
            filename
        };
        let file_key = (directory.clone(), filename.clone());
        let file_group = match files.get(&file_key) {
            Some(&group) => group,
            None => {
                let group = store.insert_group(GroupNode::new(
                    directory,
                    filename.clone(),
                    filename,
                    true,
                ));
                adopt(store, directory_group, group);
                files.insert(file_key, group);
                group
            }
        };
        adopt(store, file_group, function);
    }

    for directory in &directory_order {
        let group = directories[directory];
        if group == root {
            continue;
        }
        let parent = enclosing_directory(directory, &directories).unwrap_or(root);
        adopt(store, parent, group);
    }

    finalize(store, root, &mut HashSet::new());
    root
}

/// Closest strict ancestor of `path` that has a group.
fn enclosing_directory(path: &str, directories: &HashMap<SharedStr, NodeId>) -> Option<NodeId> {
    let mut key = path;
    while !key.is_empty() {
        let (head, _) = split_path(key);
        if head == key {
            break;
        }
        key = head;
        if let Some(&parent) = directories.get(key) {
            return Some(parent);
        }
    }
    None
}

fn adopt(store: &mut NodeStore, group: NodeId, child: NodeId) {
    if let Some(Node::Group(g)) = store.get_mut(group) {
        g.children.push(child);
    }
}
