// src/engine/runner.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::dag::{resolve, Run, RunPlan, TaskRegistry};
use crate::errors::{ConfigError, Result, TaskGraphError};
use crate::exec::TaskContext;
use crate::types::TaskName;
use crate::watch::{
    compile_bindings, spawn_dispatch_loop, spawn_watcher, DispatchOptions, DispatchStats,
    WatchBinding, WatcherHandle,
};

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: u64,
    /// The task that was requested.
    pub root: TaskName,
    /// Tasks that completed, in execution order.
    pub executed: Vec<TaskName>,
}

struct RunnerInner {
    registry: TaskRegistry,
    run_counter: AtomicU64,
    /// File watchers installed by `watch` tasks; kept for the process
    /// lifetime unless [`Runner::stop_watching`] is called.
    watchers: Mutex<Vec<WatcherHandle>>,
}

/// Executes runs against a fixed [`TaskRegistry`].
///
/// Cheap to clone; clones share the registry, the run counter and the
/// installed watchers.
#[derive(Clone)]
pub struct Runner {
    inner: Arc<RunnerInner>,
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("tasks", &self.inner.registry.len())
            .field("runs", &self.inner.run_counter.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Runner {
    pub fn new(registry: TaskRegistry) -> Self {
        Self {
            inner: Arc::new(RunnerInner {
                registry,
                run_counter: AtomicU64::new(0),
                watchers: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.inner.registry
    }

    /// Resolve the plan for `name` without executing anything.
    pub fn plan(&self, name: &str) -> Result<RunPlan> {
        Ok(resolve(&self.inner.registry, name)?)
    }

    /// Execute `name` and its transitive prerequisites.
    ///
    /// Tasks run one at a time in plan order; each task starts only after
    /// all of its prerequisites completed. The first failing task aborts
    /// the run: tasks not yet started are skipped, completed ones stay
    /// completed. Resolution errors are reported before any action runs.
    pub async fn run(&self, name: &str) -> Result<RunReport> {
        let plan = self.plan(name)?;
        let run_id = self.inner.run_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let mut run = Run::new(run_id, plan);
        let order = run.plan().order.clone();

        info!(run_id, task = %name, plan = ?order, "starting run");
        let started = Instant::now();

        for task_name in &order {
            let task = self
                .inner
                .registry
                .get(task_name)
                .ok_or_else(|| ConfigError::UnknownTask(task_name.clone()))?;

            run.start(task_name);

            let result = match task.action() {
                None => {
                    debug!(run_id, task = %task_name, "composite task; prerequisites done");
                    Ok(())
                }
                Some(action) => {
                    info!(run_id, task = %task_name, action = %action.describe(), "running task");
                    let ctx = TaskContext::new(task_name.clone(), run_id, self.clone());
                    let task_started = Instant::now();
                    let result = action.run(&ctx).await;
                    debug!(
                        run_id,
                        task = %task_name,
                        elapsed_ms = task_started.elapsed().as_millis() as u64,
                        ok = result.is_ok(),
                        "task finished"
                    );
                    result
                }
            };

            match result {
                Ok(()) => {
                    run.complete(task_name);
                }
                Err(source) => {
                    run.fail(task_name);
                    error!(
                        run_id,
                        task = %task_name,
                        error = %source,
                        skipped = ?run.pending(),
                        "task failed; aborting run"
                    );
                    return Err(TaskGraphError::Task {
                        task: task_name.clone(),
                        source,
                    });
                }
            }
        }

        info!(
            run_id,
            task = %name,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "run finished"
        );

        Ok(RunReport {
            run_id,
            root: name.to_string(),
            executed: run.completed(),
        })
    }

    /// Subscribe `bindings` to file changes under `root`.
    ///
    /// Returns once the watcher is installed. Matching changes start new
    /// runs of the bound tasks for as long as the process lives.
    pub fn watch(
        &self,
        root: &Path,
        bindings: &[WatchBinding],
        options: DispatchOptions,
    ) -> Result<()> {
        self.check_bound_tasks(bindings)?;
        let compiled = compile_bindings(bindings)?;

        let (handle, paths) = spawn_watcher(root)?;
        let watch_root = handle.root().to_path_buf();
        self.watchers().push(handle);

        spawn_dispatch_loop(self.clone(), watch_root, compiled, options, paths);
        Ok(())
    }

    /// Like [`Runner::watch`], but fed from `paths` instead of a real
    /// filesystem watcher. The loop ends when the sender side is dropped.
    pub fn watch_paths(
        &self,
        root: impl Into<PathBuf>,
        bindings: &[WatchBinding],
        options: DispatchOptions,
        paths: mpsc::UnboundedReceiver<PathBuf>,
    ) -> Result<JoinHandle<DispatchStats>> {
        self.check_bound_tasks(bindings)?;
        let compiled = compile_bindings(bindings)?;
        Ok(spawn_dispatch_loop(
            self.clone(),
            root.into(),
            compiled,
            options,
            paths,
        ))
    }

    /// Number of file watchers currently installed.
    pub fn active_watchers(&self) -> usize {
        self.watchers().len()
    }

    /// Drop every installed watcher. Their dispatch loops finish after the
    /// run in progress, if any.
    pub fn stop_watching(&self) -> usize {
        let mut watchers = self.watchers();
        let stopped = watchers.len();
        watchers.clear();
        if stopped > 0 {
            info!(stopped, "stopped file watchers");
        }
        stopped
    }

    fn check_bound_tasks(&self, bindings: &[WatchBinding]) -> Result<()> {
        for task in bindings.iter().flat_map(|b| b.tasks.iter()) {
            if !self.inner.registry.contains(task) {
                return Err(ConfigError::UnknownTask(task.clone()).into());
            }
        }
        Ok(())
    }

    fn watchers(&self) -> MutexGuard<'_, Vec<WatcherHandle>> {
        self.inner
            .watchers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
