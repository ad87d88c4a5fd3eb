use crate::model::{CallSiteKey, GraphNode, NodeStore, RawStats};

/// A record-level problem absorbed while building the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// All four counters were zero; no node was created.
    DegenerateRecordSkipped(CallSiteKey),
    /// `callee` names a caller that has no node; the edge was dropped.
    DanglingCallerReference {
        caller: CallSiteKey,
        callee: CallSiteKey,
    },
}

/// Output of [`build_call_graph`].
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    pub store: NodeStore,
    pub anomalies: Vec<Anomaly>,
}

/// Create one node per usable record, then link every node to the callers
/// it lists.
///
/// Never fails: degenerate records and unknown callers are recorded as
/// [`Anomaly`] values and otherwise ignored.
pub fn build_call_graph(raw: RawStats) -> CallGraph {
    let mut store = NodeStore::new();
    let mut anomalies = Vec::new();

    for (key, timing) in raw {
        match GraphNode::from_raw(key.clone(), timing) {
            Some(node) => {
                store.insert_leaf(node);
            }
            None => {
                log::info!("Null row: {key}");
                anomalies.push(Anomaly::DegenerateRecordSkipped(key));
            }
        }
    }

    let mut edges = Vec::new();
    for (id, node) in store.leaves() {
        for caller in node.callers.keys() {
            match store.id_of(caller) {
                Some(parent) => edges.push((parent, id)),
                None => {
                    log::debug!("{} lists unknown caller {caller}", node.key);
                    anomalies.push(Anomaly::DanglingCallerReference {
                        caller: caller.clone(),
                        callee: node.key.clone(),
                    });
                }
            }
        }
    }
    for (parent, child) in edges {
        store.link(parent, child);
    }

    log::debug!(
        "built call graph: {} nodes, {} anomalies",
        store.len(),
        anomalies.len()
    );
    CallGraph { store, anomalies }
}
