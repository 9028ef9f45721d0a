// src/dag/graph.rs

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::types::TaskName;

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone, Default)]
struct DagNode {
    /// Direct prerequisites, in declared order.
    deps: Vec<TaskName>,
    /// Direct dependents: registered tasks that list this one as a
    /// prerequisite.
    dependents: Vec<TaskName>,
}

/// In-memory task graph keyed by task name, built one node at a time.
///
/// Prerequisites may name tasks that are not registered yet; such edges are
/// kept and wired up once the target is added. Acyclicity is checked before a
/// node is inserted (see [`DagGraph::cycle_through`]).
#[derive(Debug, Clone, Default)]
pub struct DagGraph {
    nodes: HashMap<TaskName, DagNode>,
    /// Registration order.
    order: Vec<TaskName>,
}

impl DagGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Add a node with its ordered prerequisites.
    ///
    /// The caller guarantees `name` is new.
    pub fn add_node(&mut self, name: &str, deps: Vec<TaskName>) {
        // Tasks registered earlier that already point at `name`.
        let dependents: Vec<TaskName> = self
            .order
            .iter()
            .filter(|other| {
                self.nodes
                    .get(other.as_str())
                    .is_some_and(|n| n.deps.iter().any(|d| d == name))
            })
            .cloned()
            .collect();

        for dep in &deps {
            if let Some(dep_node) = self.nodes.get_mut(dep) {
                if !dep_node.dependents.iter().any(|d| d == name) {
                    dep_node.dependents.push(name.to_string());
                }
            }
        }

        self.nodes
            .insert(name.to_string(), DagNode { deps, dependents });
        self.order.push(name.to_string());
    }

    /// If adding `name` with `deps` would close a cycle, return a task on it.
    pub fn cycle_through(&self, name: &str, deps: &[TaskName]) -> Option<TaskName> {
        // Edge direction: dep -> task.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for (task, node) in &self.nodes {
            graph.add_node(task.as_str());
            for dep in &node.deps {
                graph.add_edge(dep.as_str(), task.as_str(), ());
            }
        }
        graph.add_node(name);
        for dep in deps {
            graph.add_edge(dep.as_str(), name, ());
        }

        match toposort(&graph, None) {
            Ok(_order) => None,
            Err(cycle) => Some(cycle.node_id().to_string()),
        }
    }

    /// All task names, in registration order.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// Immediate prerequisites of a task, in declared order.
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Every `(task, prerequisite)` pair whose prerequisite is not a node.
    pub fn unresolved_edges(&self) -> Vec<(TaskName, TaskName)> {
        self.order
            .iter()
            .flat_map(|task| {
                self.dependencies_of(task)
                    .iter()
                    .filter(|dep| !self.contains(dep))
                    .map(move |dep| (task.clone(), dep.clone()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
