// src/watch/mod.rs

//! File watching and change dispatch.
//!
//! This module is responsible for:
//! - Compiling watch bindings (glob patterns -> task names).
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Running bound tasks, one run at a time, when matching paths change.

pub mod dispatch;
pub mod path_utils;
pub mod patterns;
pub mod queue;
pub mod watcher;

pub use dispatch::{spawn_dispatch_loop, DispatchOptions, DispatchStats};
pub use patterns::{
    collect_matching_files, compile_bindings, tasks_for_path, CompiledBinding, PathFilter,
    WatchBinding,
};
pub use queue::TriggerQueue;
pub use watcher::{spawn_watcher, WatcherHandle};
