use std::collections::HashSet;

use crate::model::{MODULE_FUNCTION, Node, NodeId, NodeStats, NodeStore};

/// Derive a group's totals from its children, finalizing child groups first.
///
/// `visited` makes the call idempotent within one pass and stops groups that
/// reach each other from recursing forever. A group registers itself as a
/// parent of each child, except that a `local_only` group leaves the
/// call-graph `parents` of function nodes untouched.
pub fn finalize(store: &mut NodeStore, group: NodeId, visited: &mut HashSet<NodeId>) {
    if !visited.insert(group) {
        return;
    }
    let Some(node) = store.group(group) else {
        return;
    };
    let local_only = node.local_only;
    let mut children = node.children.clone();
    let mut local_children = node.local_children.clone();

    if local_only {
        let (module_level, named): (Vec<NodeId>, Vec<NodeId>) = children
            .iter()
            .partition(|&&child| is_module_level(store, child));
        local_children.extend(module_level);
        children = named;
    }

    for &child in &children {
        if store.group(child).is_some() {
            finalize(store, child, visited);
        }
        match store.get_mut(child) {
            Some(Node::Group(g)) => g.parents.push(group),
            Some(Node::Leaf(n)) if !local_only => n.parents.push(group),
            _ => {}
        }
    }

    let stats = totals(store, &children, &local_children, local_only);
    if let Some(Node::Group(g)) = store.get_mut(group) {
        g.children = children;
        g.local_children = local_children;
        g.stats = stats;
    }
}

fn is_module_level(store: &NodeStore, id: NodeId) -> bool {
    store.leaf(id).is_some_and(|n| n.name == MODULE_FUNCTION)
}

fn totals(
    store: &NodeStore,
    children: &[NodeId],
    local_children: &[NodeId],
    local_only: bool,
) -> NodeStats {
    let mut stats = NodeStats::default();

    for &child in children {
        match &store[child] {
            // A function's callees are attributed to their own files.
            Node::Leaf(n) if local_only => {
                stats.total_calls += n.stats.primitive_calls;
                stats.cumulative_time += n.stats.local_time;
            }
            node => {
                stats.total_calls += node.stats().total_calls;
                stats.cumulative_time += node.stats().cumulative_time;
            }
        }
    }
    if stats.total_calls > 0 {
        stats.cumulative_time_per_call = stats.cumulative_time / stats.total_calls as f64;
    }

    for &child in local_children {
        let own = store[child].stats();
        stats.local_time += own.local_time;
        stats.primitive_calls += own.primitive_calls;
    }
    if stats.primitive_calls > 0 {
        stats.local_time_per_call = stats.local_time / stats.primitive_calls as f64;
    }
    stats
}
