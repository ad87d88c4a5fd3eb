pub mod callee_entry;
pub mod shared_str;
pub mod sized_node;
pub mod stats_row;

pub use callee_entry::CalleeEntry;
pub use shared_str::SharedStr;
pub use sized_node::SizedNode;
pub use stats_row::StatsRow;
