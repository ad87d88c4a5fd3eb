use std::collections::{HashMap, HashSet};

use super::{CallSiteKey, GraphNode, GroupNode, Node, NodeId};

/// Arena holding every node of one load.
///
/// Edges are [`NodeId`]s into this arena, so recursive call graphs are
/// representable without shared ownership. Nodes are only ever appended.
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    nodes: Vec<Node>,
    by_key: HashMap<CallSiteKey, NodeId>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a call-graph node. A node with the same key replaces the index
    /// entry of the earlier one.
    pub fn insert_leaf(&mut self, node: GraphNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.by_key.insert(node.key.clone(), id);
        self.nodes.push(Node::Leaf(node));
        id
    }

    pub fn insert_group(&mut self, group: GroupNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::Group(group));
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn id_of(&self, key: &CallSiteKey) -> Option<NodeId> {
        self.by_key.get(key).copied()
    }

    pub fn leaf(&self, id: NodeId) -> Option<&GraphNode> {
        self.get(id).and_then(Node::as_leaf)
    }

    pub fn group(&self, id: NodeId) -> Option<&GroupNode> {
        self.get(id).and_then(Node::as_group)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node with its id, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Call-graph nodes only, in insertion order.
    pub fn leaves(&self) -> impl Iterator<Item = (NodeId, &GraphNode)> {
        self.iter().filter_map(|(id, n)| n.as_leaf().map(|leaf| (id, leaf)))
    }

    pub(crate) fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(Node::Leaf(node)) = self.get_mut(child) {
            node.parents.push(parent);
        }
        if let Some(Node::Leaf(node)) = self.get_mut(parent) {
            node.children.push(child);
        }
    }

    /// Every node reachable through `children`, each once, depth-first pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.reachable(id, Node::children)
    }

    /// Every node reachable through `parents`, each once, depth-first pre-order.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        self.reachable(id, Node::parents)
    }

    fn reachable(&self, start: NodeId, edges: fn(&Node) -> &[NodeId]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        if let Some(node) = self.get(start) {
            stack.extend(edges(node).iter().rev());
        }
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            if let Some(node) = self.get(id) {
                stack.extend(edges(node).iter().rev());
            }
        }
        order
    }
}

impl std::ops::Index<NodeId> for NodeStore {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawTiming;

    fn leaf(store: &mut NodeStore, name: &str) -> NodeId {
        let raw = RawTiming {
            primitive_calls: 1,
            total_calls: 1,
            local_time: 1.0,
            cumulative_time: 1.0,
            ..RawTiming::default()
        };
        let node = GraphNode::from_raw(CallSiteKey::new("m.py", 1, name), raw).unwrap();
        store.insert_leaf(node)
    }

    #[test]
    fn ids_follow_insertion_order() {
        let mut store = NodeStore::new();
        let a = leaf(&mut store, "a");
        let g = store.insert_group(GroupNode::new("*", "*", "<profiling run>", false));
        assert_eq!((a.index(), g.index()), (0, 1));
        assert_eq!(store.id_of(&CallSiteKey::new("m.py", 1, "a")), Some(a));
        assert_eq!(store.leaves().count(), 1);
        assert!(store[g].is_group());
    }

    #[test]
    fn traversal_visits_each_node_once_on_cycles() {
        let mut store = NodeStore::new();
        let a = leaf(&mut store, "a");
        let b = leaf(&mut store, "b");
        let c = leaf(&mut store, "c");
        store.link(a, b);
        store.link(b, a);
        store.link(b, c);
        store.link(a, c);

        assert_eq!(store.descendants(a), vec![b, a, c]);
        assert_eq!(store.ancestors(c), vec![b, a]);
        assert!(store.descendants(c).is_empty());
    }
}
