use serde::{Deserialize, Serialize};

/// Direct callees of one function, as listed in a callee map keyed by
/// `file:line(function)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalleeEntry {
    /// `file:line(function)` of every function this one called.
    pub children: Vec<String>,
    /// `[primitive_calls, total_calls, local_time, cumulative_time]`.
    pub stats: (u64, u64, f64, f64),
}
