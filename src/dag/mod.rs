// src/dag/mod.rs

//! Task graph representation and run planning.
//!
//! - [`graph`] holds the ordered prerequisite graph and rejects cycles.
//! - [`registry`] owns the named tasks and their actions.
//! - [`plan`] resolves a requested task into an execution order.
//! - [`run_state`] tracks per-task state within a single run.

pub mod graph;
pub mod plan;
pub mod registry;
pub mod run_state;

pub use graph::DagGraph;
pub use plan::{resolve, RunPlan};
pub use registry::{Task, TaskRegistry};
pub use run_state::{Run, TaskRunState};
