#![cfg(unix)]

mod common;

use common::{init_tracing, with_timeout};
use taskgraph::dag::TaskRegistry;
use taskgraph::engine::Runner;
use taskgraph::errors::{ActionError, TaskGraphError};
use taskgraph::exec::{run_command, CommandAction, LintAction};
use tempfile::TempDir;

const CLEAN_REPORT: &str =
    r#"[{"filePath":"src/js/app.js","messages":[],"errorCount":0,"warningCount":0}]"#;

const DIRTY_REPORT: &str = r#"[{"filePath":"src/js/app.js","messages":[{"ruleId":"semi","severity":2,"message":"Missing semicolon.","line":3,"column":14},{"ruleId":"quotes","severity":1,"message":"Strings must use singlequote.","line":5,"column":9}],"errorCount":1,"warningCount":1}]"#;

fn lint_runner(command: String, dir: &TempDir) -> Runner {
    let mut registry = TaskRegistry::new();
    registry
        .register_action("lint", Vec::<String>::new(), LintAction::new(command, dir.path()))
        .unwrap();
    Runner::new(registry)
}

#[tokio::test]
async fn lint_succeeds_without_findings() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let runner = lint_runner(format!("echo '{CLEAN_REPORT}'"), &dir);

    with_timeout(runner.run("lint")).await.unwrap();
}

#[tokio::test]
async fn lint_fails_with_findings() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    // ESLint exits non-zero when it reports errors.
    let runner = lint_runner(format!("echo '{DIRTY_REPORT}'; exit 1"), &dir);

    let err = with_timeout(runner.run("lint")).await.unwrap_err();

    assert!(err.is_lint_violation());
    match err {
        TaskGraphError::Task {
            task,
            source: ActionError::LintViolation { findings },
        } => {
            assert_eq!(task, "lint");
            assert_eq!(findings, 2);
        }
        other => panic!("expected LintViolation, got {other:?}"),
    }
}

#[tokio::test]
async fn warnings_alone_fail_lint() {
    let dir = TempDir::new().unwrap();
    let report = r#"[{"filePath":"a.js","messages":[{"ruleId":"eqeqeq","severity":1,"message":"Expected triple equals."}]}]"#;
    let runner = lint_runner(format!("echo '{report}'"), &dir);

    let err = with_timeout(runner.run("lint")).await.unwrap_err();
    assert!(err.is_lint_violation());
}

#[tokio::test]
async fn crashing_linter_is_a_command_failure() {
    let dir = TempDir::new().unwrap();
    let runner = lint_runner("echo 'eslint: not found' >&2; exit 127".to_string(), &dir);

    let err = with_timeout(runner.run("lint")).await.unwrap_err();

    assert!(!err.is_lint_violation());
    assert!(matches!(
        err,
        TaskGraphError::Task {
            source: ActionError::CommandFailed { code: 127, .. },
            ..
        }
    ));
}

#[tokio::test]
async fn command_runs_in_the_project_root() {
    let dir = TempDir::new().unwrap();
    let mut registry = TaskRegistry::new();
    registry
        .register_action(
            "bower",
            Vec::<String>::new(),
            CommandAction::new("echo installed > bower.log", dir.path()),
        )
        .unwrap();

    with_timeout(Runner::new(registry).run("bower")).await.unwrap();

    let written = std::fs::read_to_string(dir.path().join("bower.log")).unwrap();
    assert_eq!(written.trim(), "installed");
}

#[tokio::test]
async fn non_zero_exit_fails_the_task() {
    let dir = TempDir::new().unwrap();
    let mut registry = TaskRegistry::new();
    registry
        .register_action("babel", Vec::<String>::new(), CommandAction::new("exit 7", dir.path()))
        .unwrap();

    let err = with_timeout(Runner::new(registry).run("babel"))
        .await
        .unwrap_err();

    assert_eq!(err.failed_task(), Some("babel"));
    assert!(matches!(
        err,
        TaskGraphError::Task {
            source: ActionError::CommandFailed { code: 7, .. },
            ..
        }
    ));
}

#[tokio::test]
async fn captured_output_is_returned() {
    let dir = TempDir::new().unwrap();
    let out = run_command("printf 'a\\nb\\n'", dir.path(), true).await.unwrap();

    assert!(out.success);
    assert_eq!(out.code, 0);
    assert_eq!(out.stdout, "a\nb\n");
}
