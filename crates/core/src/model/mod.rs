pub mod call_site;
pub mod node;
pub mod raw;
pub mod store;

pub use call_site::{BUILTIN_DISPLAY, BUILTIN_FILE, CallSiteKey, MODULE_FUNCTION, split_path};
pub use node::{EPS, GraphNode, GroupNode, Node, NodeId, NodeStats};
pub use raw::{CallerStats, CallerTiming, RawStats, RawTiming, merge_raw_stats};
pub use store::NodeStore;
