use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use statree_protocol::{CalleeEntry, SizedNode, StatsRow};
use thiserror::Error;

use crate::graph::{Anomaly, build_call_graph, build_location_tree, resolve_root};
use crate::model::{CallSiteKey, NodeId, NodeStore, RawStats, merge_raw_stats};
use crate::parsers::{DumpParseError, parse_pstats_json};
use crate::views::callees::callee_map;
use crate::views::sized_tree::{SizedTreeOptions, to_sized_tree};
use crate::views::stats_table::{StatsSort, stats_table};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no usable profile records")]
    EmptyProfile,
    #[error("cannot read {}: {source}", path.display())]
    UnreadableProfileSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: DumpParseError,
    },
    #[error("stats dump: {0}")]
    Decode(#[from] DumpParseError),
}

/// Everything derived from one set of profiler statistics.
///
/// Each load owns its own [`NodeStore`]; nothing is shared between loads,
/// so a caller may run a load on a worker thread and simply drop it if it
/// takes too long.
#[derive(Debug, Clone)]
pub struct Loader {
    store: NodeStore,
    root: NodeId,
    primary_candidate: NodeId,
    structural_roots: Vec<NodeId>,
    forest: Vec<NodeId>,
    location_root: NodeId,
    anomalies: Vec<Anomaly>,
}

impl Loader {
    /// Build the call graph, its root and the location hierarchy.
    pub fn from_raw(raw: RawStats) -> Result<Self, LoadError> {
        let graph = build_call_graph(raw);
        let mut store = graph.store;
        let resolved = resolve_root(&mut store)?;
        let location_root = build_location_tree(&mut store);

        log::debug!(
            "loaded {} nodes, {} structural roots",
            store.len(),
            resolved.structural_roots.len()
        );
        Ok(Self {
            store,
            root: resolved.root,
            primary_candidate: resolved.primary_candidate,
            structural_roots: resolved.structural_roots,
            forest: resolved.forest,
            location_root,
            anomalies: graph.anomalies,
        })
    }

    /// Load a single JSON stats dump held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self, LoadError> {
        Self::from_raw(parse_pstats_json(data)?)
    }

    /// Load and merge the JSON stats dumps at `paths`.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self, LoadError> {
        let mut raw = RawStats::new();
        for path in paths {
            let path = path.as_ref();
            let data = std::fs::read(path).map_err(|source| LoadError::UnreadableProfileSource {
                path: path.to_path_buf(),
                source,
            })?;
            let stats = parse_pstats_json(&data).map_err(|source| LoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
            merge_raw_stats(&mut raw, stats);
        }
        Self::from_raw(raw)
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Root of the call graph: the lone parentless node, or a
    /// `<profiling run>` group when there are several.
    pub fn tree(&self) -> NodeId {
        self.root
    }

    /// Node with the most cumulative time.
    pub fn primary_candidate(&self) -> NodeId {
        self.primary_candidate
    }

    pub fn structural_roots(&self) -> &[NodeId] {
        &self.structural_roots
    }

    pub fn forest(&self) -> &[NodeId] {
        &self.forest
    }

    /// Root of the directory/file hierarchy.
    pub fn location_tree(&self) -> NodeId {
        self.location_root
    }

    /// Record-level problems absorbed during the load.
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn find(&self, key: &CallSiteKey) -> Option<NodeId> {
        self.store.id_of(key)
    }

    pub fn sized_tree(&self, node: NodeId, options: &SizedTreeOptions) -> SizedNode {
        to_sized_tree(&self.store, node, options)
    }

    pub fn stats_table(&self, sort: StatsSort, ascending: bool) -> Vec<StatsRow> {
        stats_table(&self.store, sort, ascending)
    }

    pub fn callee_map(&self) -> BTreeMap<String, CalleeEntry> {
        callee_map(&self.store)
    }
}
