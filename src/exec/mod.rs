// src/exec/mod.rs

//! Task actions.
//!
//! Every registered task that is not composite carries an [`Action`]. The
//! runner awaits it and treats `Err` as failure of that task.
//!
//! - [`action`] defines the [`Action`] trait, [`TaskContext`] and a closure
//!   adapter used by tests.
//! - [`command`] runs shell command lines (`babel`, `bower`, `gh-pages`).
//! - [`lint`] runs the style checker and counts its findings.
//! - [`files`] implements `clean` and `copy-src-files`.
//! - [`service_worker`] writes the generated service worker.
//! - [`serve`] is the long-lived static file server behind `serve:dev`.
//! - [`watch_task`] installs the file-change subscriptions.

pub mod action;
pub mod command;
pub mod files;
pub mod lint;
pub mod serve;
pub mod service_worker;
pub mod watch_task;

pub use action::{action_fn, Action, ActionFuture, FnAction, TaskContext};
pub use command::{run_command, CommandAction, CommandOutput};
pub use files::{clean_dir, copy_matching_files, CleanAction, CopyFilesAction};
pub use lint::LintAction;
pub use serve::{serve_dir, static_router, ServeAction};
pub use service_worker::GenerateServiceWorkerAction;
pub use watch_task::WatchAction;
