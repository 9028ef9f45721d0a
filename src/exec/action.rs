// src/exec/action.rs

//! The unit of work behind a task.
//!
//! Every action reports completion the same way: it returns a boxed future
//! that resolves to `Ok(())` or an [`ActionError`]. The runner awaits it
//! before moving on to the task's dependents.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::engine::Runner;
use crate::errors::ActionError;
use crate::types::TaskName;

/// Future returned by [`Action::run`].
pub type ActionFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ActionError>> + Send + 'a>>;

/// Trait abstracting the work a task performs.
///
/// Production code uses the built-in actions of this module; tests can
/// provide their own implementation that records calls or fails on demand.
pub trait Action: Send + Sync {
    fn run<'a>(&'a self, ctx: &'a TaskContext) -> ActionFuture<'a>;

    /// Short human-readable description used in logs and `--list`.
    fn describe(&self) -> String;
}

/// What an action knows about the run it is part of.
#[derive(Clone)]
pub struct TaskContext {
    task: TaskName,
    run_id: u64,
    runner: Runner,
}

impl TaskContext {
    pub fn new(task: TaskName, run_id: u64, runner: Runner) -> Self {
        Self {
            task,
            run_id,
            runner,
        }
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// The runner executing this run; used by actions that trigger further
    /// runs (e.g. `watch`).
    pub fn runner(&self) -> &Runner {
        &self.runner
    }
}

impl fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("task", &self.task)
            .field("run_id", &self.run_id)
            .finish_non_exhaustive()
    }
}

/// Action backed by a closure that receives an owned [`TaskContext`].
pub struct FnAction<F> {
    label: String,
    f: F,
}

impl<F, Fut> Action for FnAction<F>
where
    F: Fn(TaskContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
{
    fn run<'a>(&'a self, ctx: &'a TaskContext) -> ActionFuture<'a> {
        Box::pin((self.f)(ctx.clone()))
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// Build an [`Action`] from an async closure.
pub fn action_fn<F, Fut>(label: impl Into<String>, f: F) -> FnAction<F>
where
    F: Fn(TaskContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
{
    FnAction {
        label: label.into(),
        f,
    }
}
