use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskgraph::errors::ActionError;
use taskgraph::exec::{Action, ActionFuture, TaskContext};

/// Shared, ordered log of executed task names.
#[derive(Debug, Clone, Default)]
pub struct ExecutionLog {
    inner: Arc<Mutex<Vec<String>>>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, name: &str) {
        self.inner.lock().unwrap().push(name.to_string());
    }

    pub fn entries(&self) -> Vec<String> {
        self.inner.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.as_str() == name)
            .count()
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap().clear();
    }

    /// An action that records the task name when it runs.
    pub fn action(&self) -> RecordingAction {
        RecordingAction {
            log: self.clone(),
            delay: None,
        }
    }

    /// An action that records the task name, sleeps, then succeeds.
    pub fn slow_action(&self, delay: Duration) -> RecordingAction {
        RecordingAction {
            log: self.clone(),
            delay: Some(delay),
        }
    }

    /// An action that records the task name and then fails.
    pub fn failing_action(&self, code: i32) -> FailingAction {
        FailingAction {
            log: self.clone(),
            code,
        }
    }
}

/// Records the name of the task it runs for and succeeds.
pub struct RecordingAction {
    log: ExecutionLog,
    delay: Option<Duration>,
}

impl Action for RecordingAction {
    fn run<'a>(&'a self, ctx: &'a TaskContext) -> ActionFuture<'a> {
        Box::pin(async move {
            self.log.push(ctx.task());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(())
        })
    }

    fn describe(&self) -> String {
        "record".to_string()
    }
}

/// Records the name of the task it runs for and fails like a command
/// exiting with `code`.
pub struct FailingAction {
    log: ExecutionLog,
    code: i32,
}

impl Action for FailingAction {
    fn run<'a>(&'a self, ctx: &'a TaskContext) -> ActionFuture<'a> {
        Box::pin(async move {
            self.log.push(ctx.task());
            Err(ActionError::CommandFailed {
                command: format!("fail {}", ctx.task()),
                code: self.code,
            })
        })
    }

    fn describe(&self) -> String {
        format!("fail with {}", self.code)
    }
}
