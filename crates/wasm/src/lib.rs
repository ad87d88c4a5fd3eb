//! Browser bridge: stats-dump bytes in, renderer-ready JSON out.
//!
//! Every call loads its input from scratch and keeps nothing afterwards.

use statree_core::views::{SizedTreeOptions, StatsSort};
use statree_core::{LoadError, Loader};
use thiserror::Error;
use wasm_bindgen::prelude::*;

#[derive(Debug, Error)]
enum BridgeError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("unknown view: {0}")]
    UnknownView(String),
    #[error("unknown sort column: {0}")]
    UnknownSort(String),
}

/// Sized tree of a JSON stats dump. `view` is `"calls"` for the call tree
/// or `"location"` for the directory/file hierarchy.
#[wasm_bindgen]
pub fn sized_tree(data: &[u8], view: &str, max_depth: Option<usize>) -> Result<String, JsError> {
    Ok(sized_tree_json(data, view, max_depth)?)
}

/// Flat per-function rows of a JSON stats dump.
#[wasm_bindgen]
pub fn stats_table(data: &[u8], sort: &str, ascending: bool) -> Result<String, JsError> {
    Ok(stats_table_json(data, sort, ascending)?)
}

/// Each function's direct callees, keyed by `file:line(function)`.
#[wasm_bindgen]
pub fn callee_map(data: &[u8]) -> Result<String, JsError> {
    Ok(callee_map_json(data)?)
}

fn sized_tree_json(data: &[u8], view: &str, max_depth: Option<usize>) -> Result<String, BridgeError> {
    let options = max_depth.map_or_else(SizedTreeOptions::default, |max_depth| SizedTreeOptions {
        max_depth,
    });
    let loader = Loader::from_bytes(data)?;
    let root = match view {
        "calls" => loader.tree(),
        "location" => loader.location_tree(),
        _ => return Err(BridgeError::UnknownView(view.to_owned())),
    };
    Ok(serde_json::to_string(&loader.sized_tree(root, &options))?)
}

fn stats_table_json(data: &[u8], sort: &str, ascending: bool) -> Result<String, BridgeError> {
    let sort = match sort {
        "calls" => StatsSort::Calls,
        "local" => StatsSort::LocalTime,
        "local-per" => StatsSort::LocalPerCall,
        "cumulative" => StatsSort::CumulativeTime,
        "cumulative-per" => StatsSort::CumulativePerCall,
        "name" => StatsSort::Name,
        _ => return Err(BridgeError::UnknownSort(sort.to_owned())),
    };
    let loader = Loader::from_bytes(data)?;
    Ok(serde_json::to_string(&loader.stats_table(sort, ascending))?)
}

fn callee_map_json(data: &[u8]) -> Result<String, BridgeError> {
    let loader = Loader::from_bytes(data)?;
    Ok(serde_json::to_string(&loader.callee_map())?)
}
