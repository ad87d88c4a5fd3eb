use std::collections::HashSet;

use crate::loader::LoadError;
use crate::model::{GroupNode, NodeId, NodeStore};

use super::finalize;

/// Display name of the synthetic root joining several parentless nodes.
pub const PROFILING_RUN: &str = "<profiling run>";
/// Directory and file of the synthetic root.
const WILDCARD: &str = "*";

/// Where a call graph starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootResolution {
    /// The root callers should display.
    pub root: NodeId,
    /// The node with the most cumulative time.
    pub primary_candidate: NodeId,
    /// Every node without callers, in store order.
    pub structural_roots: Vec<NodeId>,
    /// `primary_candidate` followed by every structural root not equal to it.
    pub forest: Vec<NodeId>,
}

/// Pick the root of the call graph in `store`.
///
/// With exactly one parentless node that node is the root. With several, a
/// `<profiling run>` group over all of them is added to the store and
/// becomes the root. With none (every node has a caller) the node with the
/// most cumulative time is used.
///
/// Picking the heaviest node is a heuristic: threaded programs may produce
/// several disconnected graphs, which is why the whole forest is reported.
pub fn resolve_root(store: &mut NodeStore) -> Result<RootResolution, LoadError> {
    let mut by_time: Vec<_> = store.leaves().collect();
    by_time.sort_by(|(_, a), (_, b)| a.stats.cumulative_time.total_cmp(&b.stats.cumulative_time));
    let Some(&(primary_candidate, _)) = by_time.last() else {
        return Err(LoadError::EmptyProfile);
    };

    let structural_roots: Vec<NodeId> = store
        .leaves()
        .filter(|(_, n)| n.parents.is_empty())
        .map(|(id, n)| {
            log::debug!("Found node root: {}", n.key);
            id
        })
        .collect();

    let mut forest = vec![primary_candidate];
    forest.extend(
        structural_roots
            .iter()
            .copied()
            .filter(|&id| id != primary_candidate),
    );

    let root = match structural_roots.as_slice() {
        [] => primary_candidate,
        [only] => *only,
        many => {
            let mut run = GroupNode::new(WILDCARD, WILDCARD, PROFILING_RUN, false);
            run.children = many.to_vec();
            let run = store.insert_group(run);
            finalize(store, run, &mut HashSet::new());
            run
        }
    };

    Ok(RootResolution {
        root,
        primary_candidate,
        structural_roots,
        forest,
    })
}
