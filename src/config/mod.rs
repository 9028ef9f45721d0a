// src/config/mod.rs

//! Project configuration for taskgraph.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Fill in defaults derived from other sections and validate invariants
//!   (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{
    CommandsSection, ConfigFile, PathsSection, RawCommandsSection, RawConfigFile,
    RawServiceWorkerSection, ServerSection, WatchSection,
};
