//! Algorithms that turn raw records into the call graph and its groupings.
//!
//! ```text
//!   RawStats ──▶ build ──▶ NodeStore ──┬─▶ roots::resolve_root   (tree, forest)
//!                                      └─▶ location::build_location_tree
//! ```
//!
//! Both groupings finalize their synthetic nodes through [`finalize`].

pub mod build;
pub mod finalize;
pub mod location;
pub mod roots;

pub use build::{Anomaly, CallGraph, build_call_graph};
pub use finalize::finalize;
pub use location::{SEARCH_PATH_ROOT, build_location_tree};
pub use roots::{PROFILING_RUN, RootResolution, resolve_root};
