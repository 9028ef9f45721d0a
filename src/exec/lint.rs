// src/exec/lint.rs

//! Style checking of the script sources.
//!
//! The checker is an external command that prints an ESLint-compatible JSON
//! report on stdout. Any finding, error or warning, fails the task.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::ActionError;
use crate::exec::action::{Action, ActionFuture, TaskContext};
use crate::exec::command::run_command;

/// One file entry of the report.
#[derive(Debug, Clone, Deserialize)]
pub struct LintFileReport {
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(default)]
    pub messages: Vec<LintMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LintMessage {
    #[serde(rename = "ruleId", default)]
    pub rule_id: Option<String>,
    /// 1 = warning, 2 = error.
    #[serde(default)]
    pub severity: u8,
    pub message: String,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub column: Option<u32>,
}

impl LintMessage {
    fn severity_label(&self) -> &'static str {
        if self.severity >= 2 { "error" } else { "warning" }
    }
}

/// Parse a JSON report. Empty output means a clean run.
pub fn parse_report(stdout: &str) -> Result<Vec<LintFileReport>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).context("parsing lint report")
}

/// Total number of findings across all files.
pub fn count_findings(reports: &[LintFileReport]) -> usize {
    reports.iter().map(|r| r.messages.len()).sum()
}

/// Render findings the way a terminal formatter would.
pub fn format_findings(reports: &[LintFileReport]) -> String {
    let mut out = String::new();
    for report in reports.iter().filter(|r| !r.messages.is_empty()) {
        out.push_str(&report.file_path);
        out.push('\n');
        for m in &report.messages {
            out.push_str(&format!(
                "  {}:{}  {}  {}",
                m.line.unwrap_or(0),
                m.column.unwrap_or(0),
                m.severity_label(),
                m.message
            ));
            if let Some(rule) = &m.rule_id {
                out.push_str(&format!("  {rule}"));
            }
            out.push('\n');
        }
    }
    out
}

/// Runs the style checker over the script sources.
#[derive(Debug, Clone)]
pub struct LintAction {
    command: String,
    cwd: PathBuf,
}

impl LintAction {
    pub fn new(command: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            cwd: cwd.into(),
        }
    }
}

impl Action for LintAction {
    fn run<'a>(&'a self, ctx: &'a TaskContext) -> ActionFuture<'a> {
        Box::pin(async move {
            let output = run_command(&self.command, &self.cwd, true).await?;

            let reports = match parse_report(&output.stdout) {
                Ok(reports) => reports,
                Err(err) if !output.success => {
                    warn!(task = %ctx.task(), error = %err, "linter failed without a report");
                    return Err(ActionError::CommandFailed {
                        command: self.command.clone(),
                        code: output.code,
                    });
                }
                Err(err) => return Err(err.into()),
            };

            let findings = count_findings(&reports);
            if findings > 0 {
                print!("{}", format_findings(&reports));
                warn!(task = %ctx.task(), findings, "lint reported findings");
                return Err(ActionError::LintViolation { findings });
            }
            if !output.success {
                return Err(ActionError::CommandFailed {
                    command: self.command.clone(),
                    code: output.code,
                });
            }

            info!(task = %ctx.task(), files = reports.len(), "lint clean");
            Ok(())
        })
    }

    fn describe(&self) -> String {
        format!("lint with `{}`", self.command)
    }
}
