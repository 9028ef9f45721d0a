#![allow(dead_code)]

use taskgraph::dag::TaskRegistry;
use taskgraph_test_utils::recording::ExecutionLog;

pub use taskgraph_test_utils::{init_tracing, with_timeout};

/// Build a registry from `(task, prerequisites)` pairs where every task
/// records its name into `log` when it runs.
pub fn recording_registry(edges: &[(&str, &[&str])], log: &ExecutionLog) -> TaskRegistry {
    let mut registry = TaskRegistry::new();
    for (name, deps) in edges {
        registry
            .register_action(*name, deps.iter().copied(), log.action())
            .expect("registering test task");
    }
    registry
}

/// The shape of the project's `build` task with recording actions.
pub fn build_shaped_registry(log: &ExecutionLog) -> TaskRegistry {
    let mut registry = recording_registry(
        &[
            ("babel", &[]),
            ("bower", &[]),
            ("copy-src-files", &[]),
            ("generate-service-worker", &[]),
        ],
        log,
    );
    registry
        .register_composite(
            "build",
            ["bower", "babel", "copy-src-files", "generate-service-worker"],
        )
        .unwrap();
    registry
}
