// src/engine/mod.rs

//! Run execution.
//!
//! A [`Runner`] owns the task registry. Each call to [`Runner::run`] is an
//! independent run: it resolves a plan, executes it and reports. Runs
//! started from file changes go through the same entry point, serialized by
//! the dispatch loop in [`crate::watch::dispatch`].

pub mod runner;

pub use runner::{RunReport, Runner};
