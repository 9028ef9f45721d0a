// src/exec/watch_task.rs

use std::path::PathBuf;

use tracing::info;

use crate::errors::ActionError;
use crate::exec::action::{Action, ActionFuture, TaskContext};
use crate::watch::{DispatchOptions, WatchBinding};

/// Installs file-change subscriptions on the runner and completes.
///
/// The subscriptions outlive the run that installed them.
#[derive(Debug, Clone)]
pub struct WatchAction {
    root: PathBuf,
    bindings: Vec<WatchBinding>,
    options: DispatchOptions,
}

impl WatchAction {
    pub fn new(root: impl Into<PathBuf>, bindings: Vec<WatchBinding>, options: DispatchOptions) -> Self {
        Self {
            root: root.into(),
            bindings,
            options,
        }
    }

    pub fn bindings(&self) -> &[WatchBinding] {
        &self.bindings
    }
}

impl Action for WatchAction {
    fn run<'a>(&'a self, ctx: &'a TaskContext) -> ActionFuture<'a> {
        Box::pin(async move {
            ctx.runner()
                .watch(&self.root, &self.bindings, self.options)
                .map_err(|e| ActionError::Other(e.into()))?;
            info!(task = %ctx.task(), bindings = self.bindings.len(), "watching for changes");
            Ok(())
        })
    }

    fn describe(&self) -> String {
        format!("watch {} pattern group(s)", self.bindings.len())
    }
}
