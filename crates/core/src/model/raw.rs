use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Deserialize, Serialize};

use super::CallSiteKey;

/// Decoded profiler output: one timing record per call site.
///
/// Ordered so that everything derived from it (node ids, edge order, root
/// tie-breaks) is reproducible across loads of the same data.
pub type RawStats = BTreeMap<CallSiteKey, RawTiming>;

/// Timing record for a single call site.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTiming {
    /// Calls not counting recursive re-entry.
    pub primitive_calls: u64,
    /// Calls including recursive re-entry.
    pub total_calls: u64,
    /// Seconds spent in the function's own code.
    pub local_time: f64,
    /// Seconds spent in the function and everything it called.
    pub cumulative_time: f64,
    /// Contribution of each caller to the counters above.
    pub callers: BTreeMap<CallSiteKey, CallerStats>,
}

impl RawTiming {
    /// A record whose four counters are all zero carries no information.
    pub fn is_degenerate(&self) -> bool {
        self.primitive_calls == 0
            && self.total_calls == 0
            && self.local_time == 0.0
            && self.cumulative_time == 0.0
    }

    /// Fold another record for the same call site into this one.
    pub fn absorb(&mut self, other: RawTiming) {
        self.primitive_calls = self.primitive_calls.saturating_add(other.primitive_calls);
        self.total_calls = self.total_calls.saturating_add(other.total_calls);
        self.local_time += other.local_time;
        self.cumulative_time += other.cumulative_time;
        for (caller, stats) in other.callers {
            match self.callers.entry(caller) {
                Entry::Vacant(slot) => {
                    slot.insert(stats);
                }
                Entry::Occupied(mut slot) => {
                    let merged = slot.get().combine(stats);
                    slot.insert(merged);
                }
            }
        }
    }
}

/// Per-caller timing `(cc, nc, tt, ct)`, serialized as a 4-array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "(u64, u64, f64, f64)", into = "(u64, u64, f64, f64)")]
pub struct CallerTiming {
    pub primitive_calls: u64,
    pub total_calls: u64,
    pub local_time: f64,
    pub cumulative_time: f64,
}

impl From<(u64, u64, f64, f64)> for CallerTiming {
    fn from((primitive_calls, total_calls, local_time, cumulative_time): (u64, u64, f64, f64)) -> Self {
        Self {
            primitive_calls,
            total_calls,
            local_time,
            cumulative_time,
        }
    }
}

impl From<CallerTiming> for (u64, u64, f64, f64) {
    fn from(t: CallerTiming) -> Self {
        (t.primitive_calls, t.total_calls, t.local_time, t.cumulative_time)
    }
}

/// What a stats dump records for one caller of a function.
///
/// `cProfile` stores the full timing tuple. The older pure-Python `profile`
/// module stores only a call count, which then stands in for the caller's
/// cumulative contribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallerStats {
    Timing(CallerTiming),
    Count(f64),
}

impl CallerStats {
    /// Cumulative time this caller is responsible for.
    pub fn cumulative_contribution(&self) -> f64 {
        match self {
            Self::Timing(t) => t.cumulative_time,
            Self::Count(n) => *n,
        }
    }

    fn combine(self, other: CallerStats) -> CallerStats {
        match (self, other) {
            (Self::Timing(a), Self::Timing(b)) => Self::Timing(CallerTiming {
                primitive_calls: a.primitive_calls.saturating_add(b.primitive_calls),
                total_calls: a.total_calls.saturating_add(b.total_calls),
                local_time: a.local_time + b.local_time,
                cumulative_time: a.cumulative_time + b.cumulative_time,
            }),
            (Self::Count(a), Self::Count(b)) => Self::Count(a + b),
            (Self::Timing(t), Self::Count(n)) | (Self::Count(n), Self::Timing(t)) => {
                Self::Timing(CallerTiming {
                    cumulative_time: t.cumulative_time + n,
                    ..t
                })
            }
        }
    }
}

impl From<CallerTiming> for CallerStats {
    fn from(t: CallerTiming) -> Self {
        Self::Timing(t)
    }
}

/// Merge `other` into `into`, summing records that share a call site.
pub fn merge_raw_stats(into: &mut RawStats, other: RawStats) {
    for (key, timing) in other {
        match into.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(timing);
            }
            Entry::Occupied(mut slot) => slot.get_mut().absorb(timing),
        }
    }
}
