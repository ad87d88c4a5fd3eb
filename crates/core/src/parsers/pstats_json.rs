use serde::Deserialize;
use thiserror::Error;

use crate::model::{CallSiteKey, CallerStats, RawStats, RawTiming, merge_raw_stats};

#[derive(Debug, Error)]
pub enum DumpParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no stats records found")]
    Empty,
}

/// One `key → timing` pair of the dump.
#[derive(Debug, Deserialize)]
struct DumpEntry(CallSiteKey, DumpTiming);

/// `[primitive_calls, total_calls, local_time, cumulative_time, callers]`.
#[derive(Debug, Deserialize)]
struct DumpTiming(u64, u64, f64, f64, Vec<(CallSiteKey, CallerStats)>);

impl From<DumpTiming> for RawTiming {
    fn from(DumpTiming(nc, cc, tt, ct, callers): DumpTiming) -> Self {
        let mut timing = RawTiming {
            primitive_calls: nc,
            total_calls: cc,
            local_time: tt,
            cumulative_time: ct,
            ..RawTiming::default()
        };
        // Repeated callers are summed rather than overwritten.
        for (caller, stats) in callers {
            timing.absorb(RawTiming {
                callers: [(caller, stats)].into_iter().collect(),
                ..RawTiming::default()
            });
        }
        timing
    }
}

/// Parse a JSON export of a `pstats` stats mapping.
///
/// The dump is a list of `[key, timing]` pairs, where a key is
/// `[file, line, function]` and timing is
/// `[primitive_calls, total_calls, local_time, cumulative_time, callers]`.
/// `callers` is a list of `[key, [cc, nc, tt, ct]]` pairs, or `[key, count]`
/// for dumps written by the pure-Python `profile` module:
///
/// ```json
/// [[["app.py", 1, "<module>"], [1, 1, 0.01, 0.5, []]],
///  [["app.py", 4, "work"], [2, 2, 0.49, 0.49,
///     [[["app.py", 1, "<module>"], [2, 2, 0.49, 0.49]]]]]]
/// ```
///
/// Records repeated under the same key are merged.
pub fn parse_pstats_json(data: &[u8]) -> Result<RawStats, DumpParseError> {
    let entries: Vec<DumpEntry> = serde_json::from_slice(data)?;
    if entries.is_empty() {
        return Err(DumpParseError::Empty);
    }

    let mut stats = RawStats::new();
    for DumpEntry(key, timing) in entries {
        merge_raw_stats(&mut stats, [(key, timing.into())].into_iter().collect());
    }
    Ok(stats)
}
