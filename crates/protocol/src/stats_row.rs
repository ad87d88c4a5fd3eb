use serde::{Deserialize, Serialize};

/// One line of the flat per-function statistics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRow {
    /// Total calls, recursion included. Numeric sort key for `calls_display`.
    pub calls: u64,
    /// `"total/primitive"` for recursive functions, otherwise just the count.
    pub calls_display: String,
    pub local_time: f64,
    pub local_time_per_call: f64,
    pub cumulative_time: f64,
    pub cumulative_time_per_call: f64,
    /// `filename:line(function)`.
    pub file_line_func: String,
}
