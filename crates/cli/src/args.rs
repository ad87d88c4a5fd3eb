//! CLI argument definitions

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use statree_core::model::CallSiteKey;
use statree_core::views::{DEFAULT_MAX_DEPTH, StatsSort};

#[derive(Parser)]
#[command(
    name = "statree",
    about = "Explore deterministic-profiler statistics as call trees",
    after_help = "\
EXAMPLES:
    statree tree run.json                         Sized call tree as JSON
    statree tree run.json --by-location           Sized directory/file tree
    statree tree run.json --node 'app.py:10(run)' Tree below one function
    statree stats run.json --sort local --limit 20
    statree stats run.json --callees              Callee map as JSON
    statree roots a.json b.json                   Roots of two merged dumps"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Give up on a load that takes longer than this (seconds)
    #[arg(long, global = true, default_value = "10")]
    pub timeout_secs: u64,

    /// How often to check on the load (milliseconds)
    #[arg(long, global = true, default_value = "100")]
    pub poll_ms: u64,

    /// Log load progress and skipped records
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the size-annotated tree consumed by icicle/sunburst renderers
    Tree {
        /// JSON stats dumps, merged when several are given
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Stop expanding below this depth
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Group by directory and file instead of by caller
        #[arg(long, conflicts_with = "node")]
        by_location: bool,

        /// Start from this function instead of the root
        #[arg(long, value_name = "FILE:LINE(FUNCTION)")]
        node: Option<String>,

        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print one row of call counts and times per function
    Stats {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(long, value_enum, default_value = "cumulative")]
        sort: SortKey,

        /// Smallest values first
        #[arg(long)]
        ascending: bool,

        /// Print at most this many rows
        #[arg(long)]
        limit: Option<usize>,

        /// Print rows as JSON instead of a text table
        #[arg(long)]
        json: bool,

        /// Print each function's direct callees as JSON instead of rows
        #[arg(long, conflicts_with_all = ["limit", "json"])]
        callees: bool,
    },

    /// List the chosen root and every parentless function
    Roots {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Calls,
    Local,
    LocalPer,
    Cumulative,
    CumulativePer,
    Name,
}

impl From<SortKey> for StatsSort {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Calls => StatsSort::Calls,
            SortKey::Local => StatsSort::LocalTime,
            SortKey::LocalPer => StatsSort::LocalPerCall,
            SortKey::Cumulative => StatsSort::CumulativeTime,
            SortKey::CumulativePer => StatsSort::CumulativePerCall,
            SortKey::Name => StatsSort::Name,
        }
    }
}

/// Parse `file:line(function)`, the form call sites are printed in.
pub fn parse_call_site(site: &str) -> Result<CallSiteKey> {
    let Some((location, function)) = site.split_once('(') else {
        bail!("expected FILE:LINE(FUNCTION), got {site:?}");
    };
    let Some(function) = function.strip_suffix(')') else {
        bail!("missing closing parenthesis in {site:?}");
    };
    let Some((file, line)) = location.rsplit_once(':') else {
        bail!("missing line number in {site:?}");
    };
    let line = line
        .parse()
        .with_context(|| format!("invalid line number {line:?}"))?;
    Ok(CallSiteKey::new(file, line, function))
}
