//! Decoders for profiler output that has already left the profiler's own
//! binary format.

pub mod pstats_json;

pub use pstats_json::{DumpParseError, parse_pstats_json};
