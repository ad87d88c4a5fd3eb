//! Integration test: load a stats dump through the public API and check the
//! call graph, its roots, the location hierarchy and the sized tree.

use std::io::Write;

use statree_core::graph::{Anomaly, PROFILING_RUN, SEARCH_PATH_ROOT};
use statree_core::model::{BUILTIN_DISPLAY, CallSiteKey, NodeId};
use statree_core::views::{SIZE_BUDGET, SizedTreeOptions, StatsSort};
use statree_core::{LoadError, Loader};
use statree_protocol::SizedNode;

const THREADED_RUN: &[u8] = include_bytes!("fixtures/threaded_run.json");

fn key(file: &str, line: u32, function: &str) -> CallSiteKey {
    CallSiteKey::new(file, line, function)
}

fn name_of(loader: &Loader, id: NodeId) -> String {
    loader.store()[id].name().to_string()
}

fn assert_balanced(record: &SizedNode) {
    if let Some(children) = &record.children {
        let total: f64 = children.iter().map(|c| c.size).sum();
        assert!(
            (total - record.size).abs() <= 1e-9 * record.size.abs().max(1.0),
            "{}: children sum {total} != size {}",
            record.name,
            record.size
        );
        children.iter().for_each(assert_balanced);
    }
}

#[test]
fn degenerate_records_are_absent_from_the_store() {
    let loader = Loader::from_bytes(THREADED_RUN).unwrap();

    assert!(loader.find(&key("/srv/app/gone.py", 1, "vanished")).is_none());
    assert!(
        loader
            .find(&key("~", 0, "<method 'disable' of '_lsprof.Profiler' objects>"))
            .is_none()
    );
    assert!(
        loader
            .anomalies()
            .contains(&Anomaly::DanglingCallerReference {
                caller: key("/srv/app/gone.py", 1, "vanished"),
                callee: key("/srv/app/worker.py", 30, "poll"),
            })
    );
    let skipped = loader
        .anomalies()
        .iter()
        .filter(|a| matches!(a, Anomaly::DegenerateRecordSkipped(_)))
        .count();
    assert_eq!(skipped, 2);
}

#[test]
fn separate_threads_are_joined_under_a_profiling_run() {
    let loader = Loader::from_bytes(THREADED_RUN).unwrap();
    let store = loader.store();

    let run = store.group(loader.tree()).unwrap();
    assert_eq!(run.name, PROFILING_RUN);
    let roots: Vec<_> = run.children.iter().map(|&c| name_of(&loader, c)).collect();
    assert_eq!(roots, ["<module>", "thread_body"]);
    assert_eq!(loader.structural_roots(), run.children.as_slice());

    assert_eq!(name_of(&loader, loader.primary_candidate()), "<module>");
    assert_eq!(loader.forest().len(), 2);
    assert_eq!(loader.forest()[0], loader.primary_candidate());
}

#[test]
fn single_entry_point_is_the_tree() {
    let dump = br#"[
        [["a.py", 1, "main"], [1, 1, 0.1, 1.0, []]],
        [["a.py", 5, "f"], [1, 1, 0.9, 0.9, [[["a.py", 1, "main"], [1, 1, 0.9, 0.9]]]]]
    ]"#;
    let loader = Loader::from_bytes(dump).unwrap();

    assert!(loader.store()[loader.tree()].as_leaf().is_some());
    assert_eq!(name_of(&loader, loader.tree()), "main");
    assert_eq!(loader.forest(), &[loader.tree()]);
}

#[test]
fn location_tree_groups_by_directory_and_file() {
    let loader = Loader::from_bytes(THREADED_RUN).unwrap();
    let store = loader.store();
    let root = store.group(loader.location_tree()).unwrap();
    assert_eq!(root.name, SEARCH_PATH_ROOT);

    let child = |group: &statree_core::model::GroupNode, name: &str| {
        group
            .children
            .iter()
            .copied()
            .find(|&c| store[c].name() == name)
    };
    let builtins = child(root, BUILTIN_DISPLAY).unwrap();
    let app = store.group(child(root, "/srv/app").unwrap()).unwrap();
    let work = store.group(child(app, "/srv/app/work").unwrap()).unwrap();
    let jobs = store.group(child(work, "jobs.py").unwrap()).unwrap();

    assert_eq!(store[builtins].stats().cumulative_time, 0.05);
    assert!((jobs.stats.cumulative_time - 0.8).abs() < 1e-12);
    assert!((work.stats.cumulative_time - 0.8).abs() < 1e-12);

    let main_py = store.group(child(app, "main.py").unwrap()).unwrap();
    assert_eq!(main_py.local_children.len(), 1, "<module> is module-level time");
    assert_eq!(main_py.stats.local_time, 0.002);

    let run = loader.find(&key("/srv/app/main.py", 10, "run")).unwrap();
    let parents: Vec<_> = store[run].parents().iter().map(|&p| name_of(&loader, p)).collect();
    assert_eq!(parents, ["<module>"], "call-graph parents untouched by grouping");
}

#[test]
fn sized_tree_is_balanced_and_bounded() {
    let loader = Loader::from_bytes(THREADED_RUN).unwrap();

    for root in [loader.tree(), loader.location_tree(), loader.primary_candidate()] {
        let tree = loader.sized_tree(root, &SizedTreeOptions::default());
        assert_eq!(tree.size, SIZE_BUDGET);
        assert_balanced(&tree);
    }

    let shallow = loader.sized_tree(loader.tree(), &SizedTreeOptions { max_depth: 2 });
    assert!(shallow.height() <= 2);
}

#[test]
fn recursive_walk_appears_once_per_path() {
    let loader = Loader::from_bytes(THREADED_RUN).unwrap();
    let job = loader.find(&key("/srv/app/work/jobs.py", 4, "job")).unwrap();
    let tree = loader.sized_tree(job, &SizedTreeOptions::default());

    let walk = tree.children().iter().find(|c| c.name == "walk").unwrap();
    let inner = walk.children().iter().find(|c| c.name == "walk" && c.size < walk.size);
    assert!(walk.children().iter().filter(|c| c.name == "walk").all(SizedNode::is_leaf));
    assert!(inner.is_some());
}

#[test]
fn sized_tree_serializes_with_renderer_keys() {
    let loader = Loader::from_bytes(THREADED_RUN).unwrap();
    let tree = loader.sized_tree(loader.tree(), &SizedTreeOptions::default());
    let json = serde_json::to_value(&tree).unwrap();

    assert_eq!(json["name"], PROFILING_RUN);
    assert_eq!(json["size"], 1000.0);
    let module = &json["children"][0];
    for field in [
        "name",
        "filename",
        "directory",
        "calls",
        "recursive",
        "local",
        "localPer",
        "cumulative",
        "cumulativePer",
        "line_number",
        "size",
        "children",
    ] {
        assert!(module.get(field).is_some(), "missing {field}");
    }
}

#[test]
fn stats_table_lists_functions_only() {
    let loader = Loader::from_bytes(THREADED_RUN).unwrap();
    let rows = loader.stats_table(StatsSort::CumulativeTime, false);

    assert_eq!(rows.len(), 7);
    assert_eq!(rows[0].file_line_func, "main.py:1(<module>)");
    let walk = rows.iter().find(|r| r.file_line_func == "jobs.py:22(walk)").unwrap();
    assert_eq!(walk.calls_display, "6/2");
}

#[test]
fn callee_map_lists_direct_calls() {
    let loader = Loader::from_bytes(THREADED_RUN).unwrap();
    let map = loader.callee_map();

    assert_eq!(map.len(), 7);
    assert_eq!(
        map["/srv/app/work/jobs.py:22(walk)"].children,
        [
            "/srv/app/work/jobs.py:22(walk)",
            "~:0(<built-in method builtins.len>)"
        ]
    );
    assert_eq!(map["/srv/app/main.py:1(<module>)"].stats, (1, 1, 0.002, 1.25));
    assert!(!map.keys().any(|k| k.contains("vanished") || k.contains("disable")));
}

#[test]
fn loads_and_merges_files() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");
    std::fs::File::create(&first)
        .unwrap()
        .write_all(br#"[[["a.py", 1, "main"], [1, 1, 0.5, 1.0, []]]]"#)
        .unwrap();
    std::fs::File::create(&second)
        .unwrap()
        .write_all(br#"[[["a.py", 1, "main"], [1, 1, 0.25, 2.0, []]]]"#)
        .unwrap();

    let loader = Loader::from_paths(&[&first, &second]).unwrap();
    let main = loader.store().leaf(loader.tree()).unwrap();
    assert_eq!(main.stats.primitive_calls, 2);
    assert_eq!(main.stats.cumulative_time, 3.0);

    let missing = dir.path().join("missing.json");
    assert!(matches!(
        Loader::from_paths(&[missing]),
        Err(LoadError::UnreadableProfileSource { .. })
    ));
}

#[test]
fn all_degenerate_input_is_an_empty_profile() {
    let dump = br#"[[["a.py", 1, "f"], [0, 0, 0.0, 0.0, []]]]"#;
    assert!(matches!(Loader::from_bytes(dump), Err(LoadError::EmptyProfile)));
    assert!(matches!(Loader::from_bytes(b"[]"), Err(LoadError::Decode(_))));
}

#[test]
fn loads_are_independent() {
    let a = Loader::from_bytes(THREADED_RUN).unwrap();
    let b = Loader::from_bytes(THREADED_RUN).unwrap();
    assert_eq!(a.store().len(), b.store().len());
    assert_eq!(a.tree(), b.tree());
    let handle = std::thread::spawn(move || a.sized_tree(a.tree(), &SizedTreeOptions::default()));
    let from_thread = handle.join().unwrap();
    assert_eq!(from_thread, b.sized_tree(b.tree(), &SizedTreeOptions::default()));
}
