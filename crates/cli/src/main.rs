mod args;
mod worker;

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use statree_core::Loader;
use statree_core::model::NodeId;
use statree_core::views::{SizedTreeOptions, StatsSort};

use crate::args::{Args, Command, parse_call_site};
use crate::worker::{WorkerError, run_with_budget};

const EXIT_FAILURE: u8 = 1;
const EXIT_TIMEOUT: u8 = 3;

fn main() -> ExitCode {
    // clap exits with status 2 on usage errors.
    let args = Args::parse();

    let level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            let timed_out = matches!(e.downcast_ref::<WorkerError>(), Some(WorkerError::TimedOut(_)));
            if timed_out {
                ExitCode::from(EXIT_TIMEOUT)
            } else {
                ExitCode::from(EXIT_FAILURE)
            }
        }
    }
}

fn run(args: Args) -> Result<()> {
    let budget = Duration::from_secs(args.timeout_secs);
    let poll = Duration::from_millis(args.poll_ms);

    let output = match args.command {
        Command::Tree {
            files,
            max_depth,
            by_location,
            node,
            pretty,
        } => run_with_budget(budget, poll, move || {
            render_tree(&files, max_depth, by_location, node.as_deref(), pretty)
        })??,
        Command::Stats {
            files,
            callees: true,
            ..
        } => run_with_budget(budget, poll, move || render_callees(&files))??,
        Command::Stats {
            files,
            sort,
            ascending,
            limit,
            json,
            callees: false,
        } => run_with_budget(budget, poll, move || {
            render_stats(&files, sort.into(), ascending, limit, json)
        })??,
        Command::Roots { files } => run_with_budget(budget, poll, move || render_roots(&files))??,
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn load(files: &[PathBuf]) -> Result<Loader> {
    let loader = Loader::from_paths(files).context("failed to load profile")?;
    if !loader.anomalies().is_empty() {
        log::info!("{} records skipped or unresolved", loader.anomalies().len());
    }
    Ok(loader)
}

fn render_tree(
    files: &[PathBuf],
    max_depth: usize,
    by_location: bool,
    node: Option<&str>,
    pretty: bool,
) -> Result<String> {
    let loader = load(files)?;
    let start = match node {
        Some(site) => {
            let key = parse_call_site(site)?;
            loader
                .find(&key)
                .with_context(|| format!("{key} is not in the profile"))?
        }
        None if by_location => loader.location_tree(),
        None => loader.tree(),
    };

    let tree = loader.sized_tree(start, &SizedTreeOptions { max_depth });
    let mut json = if pretty {
        serde_json::to_string_pretty(&tree)?
    } else {
        serde_json::to_string(&tree)?
    };
    json.push('\n');
    Ok(json)
}

fn render_stats(
    files: &[PathBuf],
    sort: StatsSort,
    ascending: bool,
    limit: Option<usize>,
    json: bool,
) -> Result<String> {
    let loader = load(files)?;
    let mut rows = loader.stats_table(sort, ascending);
    if let Some(limit) = limit {
        rows.truncate(limit);
    }

    if json {
        let mut out = serde_json::to_string(&rows)?;
        out.push('\n');
        return Ok(out);
    }

    let mut out = format!(
        "{:>12} {:>10} {:>10} {:>10} {:>10}  filename:lineno(function)\n",
        "ncalls", "tottime", "percall", "cumtime", "percall"
    );
    for row in &rows {
        writeln!(
            out,
            "{:>12} {:>10.6} {:>10.6} {:>10.6} {:>10.6}  {}",
            row.calls_display,
            row.local_time,
            row.local_time_per_call,
            row.cumulative_time,
            row.cumulative_time_per_call,
            row.file_line_func
        )?;
    }
    Ok(out)
}

fn render_callees(files: &[PathBuf]) -> Result<String> {
    let loader = load(files)?;
    let mut out = serde_json::to_string(&loader.callee_map())?;
    out.push('\n');
    Ok(out)
}

fn render_roots(files: &[PathBuf]) -> Result<String> {
    let loader = load(files)?;
    let store = loader.store();
    let describe = |id: NodeId| {
        let node = &store[id];
        let name = match node.as_leaf() {
            Some(leaf) => leaf.key.to_string(),
            None => node.name().to_string(),
        };
        format!("{name} ({:.6}s)", node.stats().cumulative_time)
    };

    let mut out = format!("tree: {}\n", describe(loader.tree()));
    for &id in loader.forest() {
        let marker = if id == loader.primary_candidate() { "*" } else { " " };
        writeln!(out, "{marker} {}", describe(id))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    // `main` calls the recursive `fib`; `helper` runs on its own.
    const DUMP: &str = r#"[
        [["app.py", 1, "main"], [1, 1, 0.5, 2.0, []]],
        [["app.py", 5, "fib"], [1, 3, 1.0, 1.5,
            [[["app.py", 1, "main"], [1, 1, 1.0, 1.5]],
             [["app.py", 5, "fib"], [2, 2, 0.5, 0.5]]]]],
        [["lib/util.py", 2, "helper"], [1, 1, 0.25, 0.25, []]]
    ]"#;

    /// Width of the numeric columns, up to the `filename:lineno(function)` column.
    const NUMBERS_WIDTH: usize = 58;

    fn dump_files() -> (TempDir, Vec<PathBuf>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, DUMP).unwrap();
        (dir, vec![path])
    }

    #[test]
    fn stats_text_table_is_aligned() {
        let (_dir, files) = dump_files();
        let out = render_stats(&files, StatsSort::CumulativeTime, false, None, false).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0].split_whitespace().collect::<Vec<_>>(),
            ["ncalls", "tottime", "percall", "cumtime", "percall", "filename:lineno(function)"]
        );
        let functions: Vec<&str> = lines.iter().map(|l| &l[NUMBERS_WIDTH..]).collect();
        assert_eq!(
            functions,
            [
                "filename:lineno(function)",
                "app.py:1(main)",
                "app.py:5(fib)",
                "util.py:2(helper)"
            ]
        );
        assert_eq!(
            lines[2].split_whitespace().collect::<Vec<_>>(),
            ["3/1", "1.000000", "0.333333", "1.500000", "1.500000", "app.py:5(fib)"]
        );
    }

    #[test]
    fn stats_limit_and_json() {
        let (_dir, files) = dump_files();

        let out = render_stats(&files, StatsSort::LocalTime, false, Some(1), false).unwrap();
        assert_eq!(out.lines().count(), 2);
        assert!(out.lines().nth(1).unwrap().ends_with("app.py:5(fib)"));

        let out = render_stats(&files, StatsSort::Name, true, Some(2), true).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(rows.as_array().unwrap().len(), 2);
        assert_eq!(rows[0]["file_line_func"], "app.py:5(fib)");
    }

    #[test]
    fn roots_mark_the_primary_candidate() {
        let (_dir, files) = dump_files();
        let out = render_roots(&files).unwrap();
        assert_eq!(
            out,
            "tree: <profiling run> (2.250000s)\n\
             * app.py:1(main) (2.000000s)\n  \
             lib/util.py:2(helper) (0.250000s)\n"
        );
    }

    #[test]
    fn tree_from_a_named_function() {
        let (_dir, files) = dump_files();

        let out = render_tree(&files, 10, false, Some("app.py:5(fib)"), false).unwrap();
        let tree: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(tree["name"], "fib");
        assert_eq!(tree["size"], 1000.0);

        let err = render_tree(&files, 10, false, Some("app.py:99(nope)"), false).unwrap_err();
        assert!(format!("{err:#}").contains("app.py:99(nope) is not in the profile"));
    }

    #[test]
    fn location_tree_starts_at_the_search_path() {
        let (_dir, files) = dump_files();
        let out = render_tree(&files, 2, true, None, true).unwrap();
        let tree: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(tree["name"], "<search path>");
        assert!(out.contains("\n  "), "pretty output is indented");
    }

    #[test]
    fn callees_list_direct_calls() {
        let (_dir, files) = dump_files();
        let out = render_callees(&files).unwrap();
        let map: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(map["app.py:1(main)"]["children"][0], "app.py:5(fib)");
        assert_eq!(map["app.py:5(fib)"]["children"][0], "app.py:5(fib)");
        assert_eq!(map["app.py:5(fib)"]["stats"][1], 3);
        assert!(map.get("lib/util.py:2(helper)").is_none());
    }

    #[test]
    fn unreadable_input_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let err = render_roots(&[missing]).unwrap_err();
        assert!(format!("{err:#}").contains("absent.json"));
    }
}
