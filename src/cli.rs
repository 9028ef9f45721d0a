// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `taskgraph`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskgraph",
    version,
    about = "Build, watch, serve and publish the offline e-reader.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run. Its prerequisites run first.
    #[arg(value_name = "TASK", default_value = "default")]
    pub task: String,

    /// Path to the project config file (TOML).
    ///
    /// When the default file does not exist, built-in defaults are used.
    #[arg(long, value_name = "PATH", default_value = "Taskgraph.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKGRAPH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print every task with its prerequisites and exit.
    #[arg(long)]
    pub list: bool,

    /// Print the resolved execution order for TASK without running anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
