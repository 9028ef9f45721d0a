// src/watch/dispatch.rs

//! Turns changed paths into task runs.
//!
//! Watch-triggered runs are serialized: the loop runs one task at a time and
//! coalesces whatever arrives in the meantime through a [`TriggerQueue`].
//! A failing run is logged and the loop carries on; the next matching change
//! runs the task again.

use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::engine::Runner;
use crate::types::TriggerWhileRunningBehaviour;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::{tasks_for_path, CompiledBinding};
use crate::watch::queue::TriggerQueue;

/// Queueing options for the dispatch loop (from `[watch]`).
#[derive(Debug, Clone, Copy)]
pub struct DispatchOptions {
    pub behaviour: TriggerWhileRunningBehaviour,
    pub queue_length: usize,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            behaviour: TriggerWhileRunningBehaviour::Queue,
            queue_length: 1,
        }
    }
}

/// Counters returned when the loop ends (i.e. when the path channel closes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub runs: usize,
    pub failed_runs: usize,
}

struct Dispatcher {
    root: PathBuf,
    bindings: Vec<CompiledBinding>,
    queue: TriggerQueue,
}

impl Dispatcher {
    fn enqueue_path(&mut self, path: &PathBuf) {
        let Some(rel) = relative_str(&self.root, path) else {
            warn!("could not relativize path {:?} against root {:?}", path, self.root);
            return;
        };

        let tasks = tasks_for_path(&self.bindings, &rel);
        if tasks.is_empty() {
            return;
        }

        debug!(path = %rel, ?tasks, "watch match -> queueing tasks");
        for task in &tasks {
            self.queue.record_trigger(task);
        }
    }

    /// Pull every path that is already waiting on the channel.
    ///
    /// Returns `false` once the channel is closed.
    fn drain_channel(&mut self, paths: &mut mpsc::UnboundedReceiver<PathBuf>) -> bool {
        loop {
            match paths.try_recv() {
                Ok(path) => self.enqueue_path(&path),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }
}

/// Spawn the loop that consumes changed paths and runs bound tasks on
/// `runner`.
///
/// `root` must be the directory the paths are reported under.
pub fn spawn_dispatch_loop(
    runner: Runner,
    root: PathBuf,
    bindings: Vec<CompiledBinding>,
    options: DispatchOptions,
    mut paths: mpsc::UnboundedReceiver<PathBuf>,
) -> JoinHandle<DispatchStats> {
    let mut dispatcher = Dispatcher {
        root,
        bindings,
        queue: TriggerQueue::new(options.behaviour, options.queue_length),
    };

    tokio::spawn(async move {
        let mut stats = DispatchStats::default();
        let mut open = true;

        loop {
            if dispatcher.queue.is_empty() {
                if !open {
                    break;
                }
                match paths.recv().await {
                    Some(path) => dispatcher.enqueue_path(&path),
                    None => break,
                }
            }
            if open {
                open = dispatcher.drain_channel(&mut paths);
            }

            let tasks = dispatcher.queue.drain_pending();
            for task in tasks {
                info!(task = %task, "file change -> running task");
                stats.runs += 1;
                match runner.run(&task).await {
                    Ok(report) => {
                        debug!(task = %task, run_id = report.run_id, "watch-triggered run finished");
                    }
                    Err(err) => {
                        stats.failed_runs += 1;
                        error!(task = %task, error = %err, "watch-triggered run failed");
                    }
                }

                if open {
                    open = dispatcher.drain_channel(&mut paths);
                }
                dispatcher.queue.seal_batch();
            }
        }

        debug!(?stats, "watch dispatch loop finished");
        stats
    })
}
