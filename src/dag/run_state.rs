// src/dag/run_state.rs

//! Per-run task state.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::dag::plan::RunPlan;
use crate::types::TaskName;

/// State of a task within one run.
///
/// `Pending → Running → {Completed | Failed}`; the last two are terminal for
/// the run. Every run starts with all of its tasks `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskRunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskRunState::Completed | TaskRunState::Failed)
    }
}

/// One execution of a requested task plus its transitive prerequisites.
#[derive(Debug, Clone)]
pub struct Run {
    run_id: u64,
    plan: RunPlan,
    states: HashMap<TaskName, TaskRunState>,
}

impl Run {
    pub fn new(run_id: u64, plan: RunPlan) -> Self {
        let states = plan
            .order
            .iter()
            .map(|t| (t.clone(), TaskRunState::Pending))
            .collect();
        Self {
            run_id,
            plan,
            states,
        }
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn plan(&self) -> &RunPlan {
        &self.plan
    }

    /// `None` if `task` is not part of this run.
    pub fn state_of(&self, task: &str) -> Option<TaskRunState> {
        self.states.get(task).copied()
    }

    /// `Pending → Running`.
    pub fn start(&mut self, task: &str) -> bool {
        self.transition(task, TaskRunState::Pending, TaskRunState::Running)
    }

    /// `Running → Completed`.
    pub fn complete(&mut self, task: &str) -> bool {
        self.transition(task, TaskRunState::Running, TaskRunState::Completed)
    }

    /// `Running → Failed`.
    pub fn fail(&mut self, task: &str) -> bool {
        self.transition(task, TaskRunState::Running, TaskRunState::Failed)
    }

    /// Completed tasks, in plan order.
    pub fn completed(&self) -> Vec<TaskName> {
        self.tasks_in(TaskRunState::Completed)
    }

    /// Tasks that never started, in plan order.
    pub fn pending(&self) -> Vec<TaskName> {
        self.tasks_in(TaskRunState::Pending)
    }

    pub fn has_failed(&self) -> bool {
        self.states.values().any(|s| *s == TaskRunState::Failed)
    }

    /// True once every task completed or any task failed.
    pub fn is_finished(&self) -> bool {
        self.has_failed() || self.states.values().all(|s| *s == TaskRunState::Completed)
    }

    fn tasks_in(&self, wanted: TaskRunState) -> Vec<TaskName> {
        self.plan
            .order
            .iter()
            .filter(|t| self.states.get(t.as_str()) == Some(&wanted))
            .cloned()
            .collect()
    }

    fn transition(&mut self, task: &str, from: TaskRunState, to: TaskRunState) -> bool {
        match self.states.get_mut(task) {
            Some(state) if *state == from => {
                *state = to;
                debug!(task = %task, run_id = self.run_id, ?to, "task state changed");
                true
            }
            Some(state) => {
                warn!(
                    task = %task,
                    run_id = self.run_id,
                    current = ?state,
                    requested = ?to,
                    "ignoring invalid task state transition"
                );
                false
            }
            None => {
                warn!(task = %task, run_id = self.run_id, "task is not part of this run");
                false
            }
        }
    }
}
