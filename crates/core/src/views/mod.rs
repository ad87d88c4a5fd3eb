pub mod callees;
pub mod sized_tree;
pub mod stats_table;

pub use callees::callee_map;
pub use sized_tree::{DEFAULT_MAX_DEPTH, SIZE_BUDGET, SizedTreeOptions, to_sized_tree};
pub use stats_table::{StatsSort, stats_table};
