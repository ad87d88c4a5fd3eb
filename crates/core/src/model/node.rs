use std::collections::BTreeMap;

use statree_protocol::SharedStr;

use super::{CallSiteKey, CallerStats, RawTiming};

/// Divisor floor for per-call averages of raw records.
pub const EPS: f64 = 1e-14;

/// Index of a node inside its [`NodeStore`](super::NodeStore).
///
/// Only meaningful for the store that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Call counts and times shared by both node kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeStats {
    pub primitive_calls: u64,
    pub total_calls: u64,
    pub local_time: f64,
    pub local_time_per_call: f64,
    pub cumulative_time: f64,
    pub cumulative_time_per_call: f64,
}

/// A node of the call graph or of one of the synthetic hierarchies.
#[derive(Debug, Clone)]
pub enum Node {
    /// One profiled callable.
    Leaf(GraphNode),
    /// A synthetic aggregate: multi-root run, directory or file.
    Group(GroupNode),
}

impl Node {
    pub fn name(&self) -> &SharedStr {
        match self {
            Self::Leaf(n) => &n.name,
            Self::Group(g) => &g.name,
        }
    }

    pub fn directory(&self) -> &SharedStr {
        match self {
            Self::Leaf(n) => &n.directory,
            Self::Group(g) => &g.directory,
        }
    }

    pub fn filename(&self) -> &SharedStr {
        match self {
            Self::Leaf(n) => &n.filename,
            Self::Group(g) => &g.filename,
        }
    }

    /// Source line; groups have none.
    pub fn lineno(&self) -> Option<u32> {
        match self {
            Self::Leaf(n) => Some(n.lineno),
            Self::Group(_) => None,
        }
    }

    pub fn stats(&self) -> &NodeStats {
        match self {
            Self::Leaf(n) => &n.stats,
            Self::Group(g) => &g.stats,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match self {
            Self::Leaf(n) => &n.children,
            Self::Group(g) => &g.children,
        }
    }

    pub fn parents(&self) -> &[NodeId] {
        match self {
            Self::Leaf(n) => &n.parents,
            Self::Group(g) => &g.parents,
        }
    }

    pub fn as_leaf(&self) -> Option<&GraphNode> {
        match self {
            Self::Leaf(n) => Some(n),
            Self::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            Self::Group(g) => Some(g),
            Self::Leaf(_) => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

/// One profiled callable, built from a non-degenerate raw record.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub key: CallSiteKey,
    pub directory: SharedStr,
    pub filename: SharedStr,
    pub name: SharedStr,
    pub lineno: u32,
    pub stats: NodeStats,
    /// Raw per-caller contributions, kept for proportional sizing.
    pub callers: BTreeMap<CallSiteKey, CallerStats>,
    /// Callees, in discovery order. Not deduplicated.
    pub children: Vec<NodeId>,
    pub parents: Vec<NodeId>,
}

impl GraphNode {
    /// Build a node from its raw record. Returns `None` for degenerate records.
    pub fn from_raw(key: CallSiteKey, raw: RawTiming) -> Option<Self> {
        if raw.is_degenerate() {
            return None;
        }
        let (directory, filename) = key.split_file();
        let (directory, filename) = (SharedStr::from(directory), SharedStr::from(filename));
        let stats = NodeStats {
            primitive_calls: raw.primitive_calls,
            total_calls: raw.total_calls,
            local_time: raw.local_time,
            local_time_per_call: raw.local_time / (raw.total_calls as f64).max(EPS),
            cumulative_time: raw.cumulative_time,
            cumulative_time_per_call: raw.cumulative_time / (raw.primitive_calls as f64).max(EPS),
        };
        Some(Self {
            name: key.function.clone(),
            lineno: key.line,
            key,
            directory,
            filename,
            stats,
            callers: raw.callers,
            children: Vec::new(),
            parents: Vec::new(),
        })
    }

    /// Share of this node's cumulative time spent in calls to `child`.
    ///
    /// Read from the contribution `child` recorded for this node as caller.
    /// Zero when this node has no cumulative time or `child` does not list
    /// it as a caller.
    pub fn child_cumulative_fraction(&self, child: &GraphNode) -> f64 {
        let total = self.stats.cumulative_time;
        if total <= 0.0 {
            return 0.0;
        }
        child
            .callers
            .get(&self.key)
            .map_or(0.0, |c| c.cumulative_contribution() / total)
    }
}

/// Synthetic node whose totals are derived from its children on finalization.
#[derive(Debug, Clone)]
pub struct GroupNode {
    pub directory: SharedStr,
    pub filename: SharedStr,
    pub name: SharedStr,
    pub children: Vec<NodeId>,
    /// Module-level records of a file, split off during finalization.
    pub local_children: Vec<NodeId>,
    pub parents: Vec<NodeId>,
    /// Sum children's local contributions instead of their cumulative time.
    pub local_only: bool,
    /// Zero until the group is finalized.
    pub stats: NodeStats,
}

impl GroupNode {
    pub fn new(
        directory: impl Into<SharedStr>,
        filename: impl Into<SharedStr>,
        name: impl Into<SharedStr>,
        local_only: bool,
    ) -> Self {
        Self {
            directory: directory.into(),
            filename: filename.into(),
            name: name.into(),
            children: Vec::new(),
            local_children: Vec::new(),
            parents: Vec::new(),
            local_only,
            stats: NodeStats::default(),
        }
    }
}
