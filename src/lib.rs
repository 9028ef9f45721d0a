// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod project;
pub mod sw;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::load_or_default;
use crate::dag::TaskRegistry;
use crate::engine::Runner;
use crate::fs::RealFileSystem;
use crate::project::build_registry;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the project task registry
/// - the runner
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_or_default(&config_path)
        .with_context(|| format!("loading config {:?}", config_path))?;

    let root = config_root_dir(&config_path);
    debug!(root = ?root, "project root");

    let registry = build_registry(&cfg, &root, Arc::new(RealFileSystem))?;

    if args.list {
        print_task_list(&registry);
        return Ok(());
    }

    let runner = Runner::new(registry);

    if args.dry_run {
        let plan = runner.plan(&args.task)?;
        println!("taskgraph dry-run: {}", plan.root);
        for (idx, task) in plan.order.iter().enumerate() {
            println!("  {}. {task}", idx + 1);
        }
        return Ok(());
    }

    tokio::select! {
        result = runner.run(&args.task) => {
            let report = result?;
            info!(run_id = report.run_id, executed = ?report.executed, "done");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted; shutting down");
            return Ok(());
        }
    }

    // A run that only installed watchers keeps the process alive.
    if runner.active_watchers() > 0 {
        info!("watching for changes; press Ctrl-C to stop");
        tokio::signal::ctrl_c()
            .await
            .context("listening for Ctrl-C")?;
        runner.stop_watching();
    }

    Ok(())
}

/// Figure out the project root.
///
/// - If the config path has a non-empty parent (e.g. "site/Taskgraph.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Taskgraph.toml" (parent = ""),
///   we fall back to the current working directory.
///
/// The result is absolute so watcher events can be relativized against it.
fn config_root_dir(config_path: &Path) -> PathBuf {
    let root = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    root.canonicalize().unwrap_or(root)
}

fn print_task_list(registry: &TaskRegistry) {
    println!("tasks ({}):", registry.len());
    for name in registry.task_names() {
        println!("  - {name}");
        let prerequisites = registry.prerequisites_of(name);
        if !prerequisites.is_empty() {
            println!("      after: {}", prerequisites.join(", "));
        }
        if let Some(action) = registry.get(name).and_then(|t| t.action()) {
            println!("      does: {}", action.describe());
        }
    }
}
