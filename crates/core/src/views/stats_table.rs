use std::cmp::Ordering;

use statree_protocol::StatsRow;

use crate::model::{GraphNode, NodeStore};

/// Column the statistics table is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsSort {
    Calls,
    LocalTime,
    LocalPerCall,
    CumulativeTime,
    CumulativePerCall,
    Name,
}

/// One row per profiled function, synthetic groups excluded.
///
/// `ascending = false` puts the largest values (or the last names) first.
/// Rows that compare equal keep node-store order.
pub fn stats_table(store: &NodeStore, sort: StatsSort, ascending: bool) -> Vec<StatsRow> {
    let mut nodes: Vec<&GraphNode> = store.leaves().map(|(_, n)| n).collect();
    nodes.sort_by(|a, b| {
        let order = compare(a, b, sort);
        if ascending { order } else { order.reverse() }
    });
    nodes.into_iter().map(row).collect()
}

fn compare(a: &GraphNode, b: &GraphNode, sort: StatsSort) -> Ordering {
    match sort {
        StatsSort::Calls => a.stats.total_calls.cmp(&b.stats.total_calls),
        StatsSort::LocalTime => a.stats.local_time.total_cmp(&b.stats.local_time),
        StatsSort::LocalPerCall => a
            .stats
            .local_time_per_call
            .total_cmp(&b.stats.local_time_per_call),
        StatsSort::CumulativeTime => a.stats.cumulative_time.total_cmp(&b.stats.cumulative_time),
        StatsSort::CumulativePerCall => a
            .stats
            .cumulative_time_per_call
            .total_cmp(&b.stats.cumulative_time_per_call),
        StatsSort::Name => a.name.cmp(&b.name),
    }
}

fn row(node: &GraphNode) -> StatsRow {
    let stats = &node.stats;
    let calls_display = if stats.total_calls > stats.primitive_calls {
        format!("{}/{}", stats.total_calls, stats.primitive_calls)
    } else {
        stats.primitive_calls.to_string()
    };
    StatsRow {
        calls: stats.total_calls,
        calls_display,
        local_time: stats.local_time,
        local_time_per_call: stats.local_time_per_call,
        cumulative_time: stats.cumulative_time,
        cumulative_time_per_call: stats.cumulative_time_per_call,
        file_line_func: format!("{}:{}({})", node.filename, node.lineno, node.name),
    }
}
