use statree_protocol::SizedNode;

use crate::model::{Node, NodeId, NodeStore};

/// Size of the root record; every other size is a share of it.
pub const SIZE_BUDGET: f64 = 1000.0;
pub const DEFAULT_MAX_DEPTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizedTreeOptions {
    /// Records deeper than this are never expanded.
    pub max_depth: usize,
}

impl Default for SizedTreeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Nodes on the path from the root to the record being expanded.
///
/// Lives on the stack of the recursion; each level links to the one above.
struct Ancestors<'a> {
    node: NodeId,
    up: Option<&'a Ancestors<'a>>,
}

impl Ancestors<'_> {
    fn contains(&self, id: NodeId) -> bool {
        let mut current = Some(self);
        while let Some(level) = current {
            if level.node == id {
                return true;
            }
            current = level.up;
        }
        false
    }
}

/// Unfold the graph below `node` into a finite tree of sized records.
///
/// The root gets [`SIZE_BUDGET`]; a child gets the share of its parent's
/// size that its time accounts for. A child that already appears on the
/// path from the root is emitted without children, and records at
/// `max_depth` are not expanded, so recursive graphs terminate.
///
/// After the children of a record are built their sizes are made to add up
/// to the record's own size: a shortfall becomes one extra leaf describing
/// the record itself (its self time), an excess scales the children's
/// subtrees down.
pub fn to_sized_tree(store: &NodeStore, node: NodeId, options: &SizedTreeOptions) -> SizedNode {
    sized(store, node, SIZE_BUDGET, None, options.max_depth, 0)
}

fn sized(
    store: &NodeStore,
    id: NodeId,
    size: f64,
    ancestors: Option<&Ancestors<'_>>,
    max_depth: usize,
    depth: usize,
) -> SizedNode {
    let node = &store[id];
    let mut record = describe(node, size);
    if depth >= max_depth || node.children().is_empty() {
        return record;
    }

    let path = Ancestors {
        node: id,
        up: ancestors,
    };
    let children = node
        .children()
        .iter()
        .map(|&child| {
            let child_size = share_of(store, id, size, child);
            if path.contains(child) {
                describe(&store[child], child_size)
            } else {
                sized(store, child, child_size, Some(&path), max_depth, depth + 1)
            }
        })
        .collect();

    settle(&mut record, children);
    record
}

/// Size of `child` when drawn inside `parent`, which was given `parent_size`.
fn share_of(store: &NodeStore, parent: NodeId, parent_size: f64, child: NodeId) -> f64 {
    match (&store[parent], &store[child]) {
        (Node::Group(group), child) => {
            let total = group.stats.cumulative_time;
            if total > 0.0 {
                child.stats().cumulative_time / total * parent_size
            } else {
                0.0
            }
        }
        (Node::Leaf(caller), Node::Leaf(callee)) => {
            caller.child_cumulative_fraction(callee) * parent_size
        }
        // Functions never call groups.
        (Node::Leaf(_), Node::Group(_)) => 0.0,
    }
}

fn describe(node: &Node, size: f64) -> SizedNode {
    let stats = node.stats();
    SizedNode {
        name: node.name().clone(),
        filename: node.filename().clone(),
        directory: node.directory().clone(),
        calls: stats.primitive_calls,
        recursive: stats.total_calls,
        local: stats.local_time,
        local_per: stats.local_time_per_call,
        cumulative: stats.cumulative_time,
        cumulative_per: stats.cumulative_time_per_call,
        line_number: node.lineno(),
        size,
        children: None,
    }
}

fn settle(record: &mut SizedNode, mut children: Vec<SizedNode>) {
    let total: f64 = children.iter().map(|c| c.size).sum();
    if total > record.size {
        let factor = record.size / total;
        for child in &mut children {
            child.scale(factor);
        }
    } else if total < record.size {
        let mut own_time = record.clone();
        own_time.size = record.size - total;
        children.push(own_time);
    }
    record.children = Some(children);
}
