mod common;

use std::path::PathBuf;
use std::time::Duration;

use common::{init_tracing, recording_registry, with_timeout};
use taskgraph::config::ConfigFile;
use taskgraph::dag::TaskRegistry;
use taskgraph::engine::Runner;
use taskgraph::project::default_watch_bindings;
use taskgraph::types::TriggerWhileRunningBehaviour;
use taskgraph::watch::{DispatchOptions, DispatchStats, WatchBinding};
use taskgraph_test_utils::recording::ExecutionLog;
use tokio::sync::mpsc;

const ROOT: &str = "/proj";

fn project_runner(log: &ExecutionLog) -> Runner {
    Runner::new(recording_registry(
        &[("babel", &[]), ("bower", &[]), ("copy-src-files", &[])],
        log,
    ))
}

fn changed(rel: &str) -> PathBuf {
    PathBuf::from(ROOT).join(rel)
}

/// Feed `paths` to a dispatch loop over the project bindings and wait for
/// it to finish.
async fn dispatch_all(runner: &Runner, paths: &[&str]) -> DispatchStats {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = runner
        .watch_paths(
            ROOT,
            &default_watch_bindings(&ConfigFile::default()),
            DispatchOptions::default(),
            rx,
        )
        .unwrap();

    for p in paths {
        tx.send(changed(p)).unwrap();
    }
    drop(tx);

    with_timeout(handle).await.unwrap()
}

#[tokio::test]
async fn js_change_runs_babel_exactly_once() {
    init_tracing();

    let log = ExecutionLog::new();
    let runner = project_runner(&log);

    let stats = dispatch_all(&runner, &["src/js/app.js"]).await;

    assert_eq!(stats.runs, 1);
    assert_eq!(log.entries(), vec!["babel"]);
}

#[tokio::test]
async fn bower_manifest_change_runs_bower() {
    let log = ExecutionLog::new();
    let runner = project_runner(&log);

    dispatch_all(&runner, &["bower.json"]).await;

    assert_eq!(log.entries(), vec!["bower"]);
}

#[tokio::test]
async fn non_script_sources_run_copy() {
    let log = ExecutionLog::new();
    let runner = project_runner(&log);

    dispatch_all(&runner, &["src/index.html"]).await;
    dispatch_all(&runner, &["src/css/reader.css"]).await;

    assert_eq!(log.entries(), vec!["copy-src-files", "copy-src-files"]);
}

#[tokio::test]
async fn nested_scripts_do_not_trigger_copy() {
    let log = ExecutionLog::new();
    let runner = project_runner(&log);

    dispatch_all(&runner, &["src/js/lib/epub.js"]).await;

    assert_eq!(log.entries(), vec!["babel"]);
}

#[tokio::test]
async fn unrelated_paths_are_ignored() {
    let log = ExecutionLog::new();
    let runner = project_runner(&log);

    let stats = dispatch_all(&runner, &["README.md", "dev/js/app.js"]).await;

    assert_eq!(stats.runs, 0);
    assert!(log.entries().is_empty());
}

#[tokio::test]
async fn burst_of_changes_is_coalesced() {
    init_tracing();

    let log = ExecutionLog::new();
    let runner = project_runner(&log);

    let stats = dispatch_all(
        &runner,
        &["src/js/a.js", "src/js/b.js", "src/js/c.js", "bower.json"],
    )
    .await;

    assert_eq!(stats.runs, 2);
    assert_eq!(log.count("babel"), 1);
    assert_eq!(log.count("bower"), 1);
}

/// Recording tasks that stay busy long enough for changes to land mid-run.
fn slow_project_runner(log: &ExecutionLog) -> Runner {
    let mut registry = TaskRegistry::new();
    for task in ["babel", "bower", "copy-src-files"] {
        registry
            .register_action(
                task,
                Vec::<String>::new(),
                log.slow_action(Duration::from_millis(100)),
            )
            .unwrap();
    }
    Runner::new(registry)
}

async fn wait_for(log: &ExecutionLog, task: &str, times: usize) {
    with_timeout(async {
        while log.count(task) < times {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
}

#[tokio::test]
async fn changes_during_consecutive_runs_are_all_acted_on() {
    init_tracing();

    let log = ExecutionLog::new();
    let runner = slow_project_runner(&log);

    let (tx, rx) = mpsc::unbounded_channel();
    let handle = runner
        .watch_paths(
            ROOT,
            &default_watch_bindings(&ConfigFile::default()),
            DispatchOptions::default(),
            rx,
        )
        .unwrap();

    tx.send(changed("src/js/app.js")).unwrap();
    tx.send(changed("bower.json")).unwrap();

    wait_for(&log, "babel", 1).await;
    tx.send(changed("src/index.html")).unwrap();

    wait_for(&log, "bower", 1).await;
    tx.send(changed("src/js/app.js")).unwrap();
    drop(tx);

    let stats = with_timeout(handle).await.unwrap();

    assert_eq!(log.count("copy-src-files"), 1);
    assert_eq!(log.count("babel"), 2);
    assert_eq!(log.count("bower"), 1);
    assert_eq!(stats.runs, 4);
    assert_eq!(stats.failed_runs, 0);
}

#[tokio::test]
async fn failed_run_is_not_retried_and_the_loop_continues() {
    init_tracing();

    let log = ExecutionLog::new();
    let mut registry = recording_registry(&[("bower", &[])], &log);
    registry
        .register_action("babel", Vec::<String>::new(), log.failing_action(1))
        .unwrap();
    let runner = Runner::new(registry);

    let (tx, rx) = mpsc::unbounded_channel();
    let handle = runner
        .watch_paths(
            ROOT,
            &[WatchBinding::new(["src/js/**/*.js"], ["babel"])],
            DispatchOptions::default(),
            rx,
        )
        .unwrap();

    tx.send(changed("src/js/app.js")).unwrap();
    with_timeout(async {
        while log.count("babel") < 1 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;

    tx.send(changed("src/js/app.js")).unwrap();
    drop(tx);

    let stats = with_timeout(handle).await.unwrap();
    assert_eq!(stats.runs, 2);
    assert_eq!(stats.failed_runs, 2);
    assert_eq!(log.count("babel"), 2);
}

#[tokio::test]
async fn cancel_behaviour_keeps_only_the_latest_batch() {
    init_tracing();

    let log = ExecutionLog::new();
    let mut registry = recording_registry(&[("bower", &[])], &log);
    registry
        .register_action(
            "babel",
            Vec::<String>::new(),
            log.slow_action(Duration::from_millis(50)),
        )
        .unwrap();
    let runner = Runner::new(registry);

    let (tx, rx) = mpsc::unbounded_channel();
    let handle = runner
        .watch_paths(
            ROOT,
            &[
                WatchBinding::new(["src/js/**/*.js"], ["babel"]),
                WatchBinding::new(["bower.json"], ["bower"]),
            ],
            DispatchOptions {
                behaviour: TriggerWhileRunningBehaviour::Cancel,
                queue_length: 1,
            },
            rx,
        )
        .unwrap();

    tx.send(changed("src/js/app.js")).unwrap();
    with_timeout(async {
        while log.count("babel") < 1 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;

    // Both arrive while babel is still running.
    tx.send(changed("src/js/app.js")).unwrap();
    tx.send(changed("bower.json")).unwrap();
    drop(tx);

    with_timeout(handle).await.unwrap();
    assert!(log.count("babel") >= 1);
    assert_eq!(log.entries().last().map(String::as_str), Some("bower"));
}

#[tokio::test]
async fn bindings_to_unknown_tasks_are_rejected() {
    let log = ExecutionLog::new();
    let runner = project_runner(&log);
    let (_tx, rx) = mpsc::unbounded_channel();

    let err = runner
        .watch_paths(
            ROOT,
            &[WatchBinding::new(["*.md"], ["docs"])],
            DispatchOptions::default(),
            rx,
        )
        .unwrap_err();

    assert!(err.is_config_error());
}
