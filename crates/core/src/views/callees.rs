use std::collections::BTreeMap;

use statree_protocol::CalleeEntry;

use crate::model::{GraphNode, NodeStore};

/// Every function's direct callees, keyed by its `file:line(function)`.
///
/// Functions that neither call anything nor are called by another function
/// are left out; they are usually profiler bookkeeping.
pub fn callee_map(store: &NodeStore) -> BTreeMap<String, CalleeEntry> {
    store
        .leaves()
        .filter(|(_, node)| !node.children.is_empty() || has_function_caller(store, node))
        .map(|(_, node)| {
            let children = node
                .children
                .iter()
                .filter_map(|&child| store.leaf(child))
                .map(|child| child.key.to_string())
                .collect();
            let s = &node.stats;
            let entry = CalleeEntry {
                children,
                stats: (s.primitive_calls, s.total_calls, s.local_time, s.cumulative_time),
            };
            (node.key.to_string(), entry)
        })
        .collect()
}

// A `<profiling run>` group is a parent too, but not a caller.
fn has_function_caller(store: &NodeStore, node: &GraphNode) -> bool {
    node.parents.iter().any(|&parent| store.leaf(parent).is_some())
}
