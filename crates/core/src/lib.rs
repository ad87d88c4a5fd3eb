//! Reconstruct call graphs from deterministic-profiler statistics and turn
//! them into trees sized for icicle/sunburst rendering.
//!
//! ```text
//!   JSON stats dump ──▶ RawStats ──▶ Loader ──┬─▶ tree()           call graph root
//!     (parsers)          (model)     (graph)  ├─▶ location_tree()  directory/file root
//!                                             └─▶ forest()         every root found
//!
//!   any node ──▶ views::to_sized_tree ──▶ SizedNode (JSON for renderers)
//!   all nodes ──▶ views::stats_table  ──▶ StatsRow[]
//! ```

pub mod graph;
pub mod loader;
pub mod model;
pub mod parsers;
pub mod views;

pub use loader::{LoadError, Loader};
