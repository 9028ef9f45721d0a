// src/dag/plan.rs

//! Run planning: which tasks a run executes, and in which order.

use std::collections::HashSet;

use crate::dag::registry::TaskRegistry;
use crate::errors::ConfigError;
use crate::types::TaskName;

/// Ordered list of tasks to execute for one requested task.
///
/// Prerequisites come before their dependents; each task appears once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub root: TaskName,
    pub order: Vec<TaskName>,
}

impl RunPlan {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn position(&self, task: &str) -> Option<usize> {
        self.order.iter().position(|t| t == task)
    }
}

/// Resolve `name` depth-first, visiting prerequisites in their listed order.
///
/// A prerequisite shared by several branches is placed once, at its first
/// (leftmost) position. Nothing is executed here, so an unknown name is
/// reported before any action runs.
pub fn resolve(registry: &TaskRegistry, name: &str) -> Result<RunPlan, ConfigError> {
    if !registry.contains(name) {
        return Err(ConfigError::UnknownTask(name.to_string()));
    }

    let mut walk = Walk {
        registry,
        visiting: HashSet::new(),
        done: HashSet::new(),
        order: Vec::new(),
    };
    walk.visit(name)?;

    Ok(RunPlan {
        root: name.to_string(),
        order: walk.order,
    })
}

struct Walk<'a> {
    registry: &'a TaskRegistry,
    /// Tasks on the current DFS path.
    visiting: HashSet<TaskName>,
    done: HashSet<TaskName>,
    order: Vec<TaskName>,
}

impl Walk<'_> {
    fn visit(&mut self, name: &str) -> Result<(), ConfigError> {
        if self.done.contains(name) {
            return Ok(());
        }
        if !self.visiting.insert(name.to_string()) {
            // Registration rejects cycles; this only guards hand-built graphs.
            return Err(ConfigError::Cycle {
                task: name.to_string(),
            });
        }

        for dep in self.registry.prerequisites_of(name) {
            if !self.registry.contains(dep) {
                return Err(ConfigError::UnknownDependency {
                    task: name.to_string(),
                    dependency: dep.clone(),
                });
            }
            self.visit(dep)?;
        }

        self.visiting.remove(name);
        self.done.insert(name.to_string());
        self.order.push(name.to_string());
        Ok(())
    }
}
