// src/dag/registry.rs

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::dag::graph::DagGraph;
use crate::errors::ConfigError;
use crate::exec::Action;
use crate::types::TaskName;

/// A named unit of build work.
///
/// A task without an action is composite: it completes as soon as its
/// prerequisites have.
#[derive(Clone)]
pub struct Task {
    name: TaskName,
    prerequisites: Vec<TaskName>,
    action: Option<Arc<dyn Action>>,
}

impl Task {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prerequisites(&self) -> &[TaskName] {
        &self.prerequisites
    }

    pub fn action(&self) -> Option<&Arc<dyn Action>> {
        self.action.as_ref()
    }

    pub fn is_composite(&self) -> bool {
        self.action.is_none()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("prerequisites", &self.prerequisites)
            .field("action", &self.action.as_ref().map(|a| a.describe()))
            .finish()
    }
}

/// Registry of named tasks and the graph formed by their prerequisites.
///
/// Built once, then shared read-only by a [`crate::engine::Runner`].
#[derive(Debug, Default)]
pub struct TaskRegistry {
    graph: DagGraph,
    tasks: HashMap<TaskName, Task>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task.
    ///
    /// Prerequisites may be registered later. Fails if `name` is taken or if
    /// the new edges close a cycle with already registered tasks.
    pub fn register<N, P>(
        &mut self,
        name: N,
        prerequisites: P,
        action: Option<Arc<dyn Action>>,
    ) -> Result<(), ConfigError>
    where
        N: Into<TaskName>,
        P: IntoIterator,
        P::Item: Into<TaskName>,
    {
        let name = name.into();
        if self.tasks.contains_key(&name) {
            return Err(ConfigError::DuplicateTask(name));
        }

        let prerequisites: Vec<TaskName> = prerequisites.into_iter().map(Into::into).collect();
        if prerequisites.iter().any(|p| *p == name) {
            return Err(ConfigError::Cycle { task: name });
        }
        if let Some(task) = self.graph.cycle_through(&name, &prerequisites) {
            return Err(ConfigError::Cycle { task });
        }

        debug!(task = %name, ?prerequisites, composite = action.is_none(), "registered task");

        self.graph.add_node(&name, prerequisites.clone());
        self.tasks.insert(
            name.clone(),
            Task {
                name,
                prerequisites,
                action,
            },
        );
        Ok(())
    }

    /// Register a task backed by `action`.
    pub fn register_action<N, P, A>(
        &mut self,
        name: N,
        prerequisites: P,
        action: A,
    ) -> Result<(), ConfigError>
    where
        N: Into<TaskName>,
        P: IntoIterator,
        P::Item: Into<TaskName>,
        A: Action + 'static,
    {
        self.register(name, prerequisites, Some(Arc::new(action)))
    }

    /// Register a task with no action of its own.
    pub fn register_composite<N, P>(&mut self, name: N, prerequisites: P) -> Result<(), ConfigError>
    where
        N: Into<TaskName>,
        P: IntoIterator,
        P::Item: Into<TaskName>,
    {
        self.register(name, prerequisites, None)
    }

    /// Check that every prerequisite resolves to a registered task.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.graph.unresolved_edges().into_iter().next() {
            Some((task, dependency)) => Err(ConfigError::UnknownDependency { task, dependency }),
            None => Ok(()),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Task names in registration order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.graph.tasks()
    }

    pub fn prerequisites_of(&self, name: &str) -> &[TaskName] {
        self.graph.dependencies_of(name)
    }

    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.graph.dependents_of(name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
