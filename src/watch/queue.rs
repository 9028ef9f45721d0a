// src/watch/queue.rs

use std::collections::VecDeque;

use tracing::debug;

use crate::types::{TaskName, TriggerWhileRunningBehaviour};

/// Queue of watch triggers that arrive while a watch-triggered run is
/// executing.
///
/// Semantics:
/// - Each queued entry is a *batch* of task names, kept in trigger order and
///   without duplicates.
/// - `max_batches` (`[watch].queue_length`) bounds how many batches are kept.
///   Past the bound the two oldest batches are folded into one, so a trigger
///   is never lost, only coalesced with its neighbours.
/// - [`TriggerQueue::drain_pending`] merges everything queued into one
///   ordered list; each task in it is run once.
#[derive(Debug)]
pub struct TriggerQueue {
    behaviour: TriggerWhileRunningBehaviour,
    max_batches: usize,
    batches: VecDeque<Vec<TaskName>>,
}

impl TriggerQueue {
    /// `max_batches` is clamped to at least 1.
    pub fn new(behaviour: TriggerWhileRunningBehaviour, max_batches: usize) -> Self {
        Self {
            behaviour,
            max_batches: max_batches.max(1),
            batches: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn behaviour(&self) -> TriggerWhileRunningBehaviour {
        self.behaviour
    }

    /// Record that `task` was triggered.
    ///
    /// - `Queue`: merge into the last batch (coalescing repeated triggers of
    ///   the same task), creating one if needed.
    /// - `Cancel`: drop all batches and keep only this task.
    pub fn record_trigger(&mut self, task: &str) {
        match self.behaviour {
            TriggerWhileRunningBehaviour::Queue => {
                match self.batches.back_mut() {
                    Some(last) => {
                        if !last.iter().any(|t| t == task) {
                            last.push(task.to_string());
                        }
                        debug!(task = %task, "merged trigger into last queued batch (queue mode)");
                    }
                    None => {
                        self.batches.push_back(vec![task.to_string()]);
                        debug!(task = %task, "created first queued batch (queue mode)");
                    }
                }

                if self.batches.len() > self.max_batches {
                    debug!(
                        current_batches = self.batches.len(),
                        max_batches = self.max_batches,
                        "exceeded queue_length; folding oldest batches together"
                    );
                    while self.batches.len() > self.max_batches {
                        self.fold_oldest();
                    }
                }
            }
            TriggerWhileRunningBehaviour::Cancel => {
                debug!(task = %task, "resetting queued batches to this task only (cancel mode)");
                self.batches.clear();
                self.batches.push_back(vec![task.to_string()]);
            }
        }
    }

    fn fold_oldest(&mut self) {
        let Some(oldest) = self.batches.pop_front() else {
            return;
        };
        match self.batches.front_mut() {
            Some(next) => {
                let mut merged = oldest;
                for task in next.drain(..) {
                    if !merged.contains(&task) {
                        merged.push(task);
                    }
                }
                *next = merged;
            }
            None => self.batches.push_front(oldest),
        }
    }

    /// Number of batches currently queued.
    pub fn pending_batches(&self) -> usize {
        self.batches.iter().filter(|b| !b.is_empty()).count()
    }

    /// Close the current batch so later triggers start a new one.
    pub fn seal_batch(&mut self) {
        if self.batches.back().is_some_and(|b| !b.is_empty()) {
            self.batches.push_back(Vec::new());
        }
    }

    /// Drain every queued batch into a single ordered, de-duplicated list.
    pub fn drain_pending(&mut self) -> Vec<TaskName> {
        let mut merged: Vec<TaskName> = Vec::new();
        while let Some(batch) = self.batches.pop_front() {
            for task in batch {
                if !merged.contains(&task) {
                    merged.push(task);
                }
            }
        }
        debug!(drained = merged.len(), "drained queued triggers");
        merged
    }
}
