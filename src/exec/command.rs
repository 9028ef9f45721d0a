// src/exec/command.rs

//! Shell command execution for tasks that delegate to external tools.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::errors::ActionError;
use crate::exec::action::{Action, ActionFuture, TaskContext};

/// Result of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub code: i32,
    pub success: bool,
    /// Captured stdout; empty unless capture was requested.
    pub stdout: String,
}

/// Build a shell command appropriate for the platform.
fn shell(command: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    }
}

/// Forward each line of `reader` to the terminal, or collect it when
/// `capture` is set.
fn pump<R>(reader: R, to_stderr: bool, capture: bool) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        let mut captured = String::new();
        while let Ok(Some(line)) = lines.next_line().await {
            if capture {
                captured.push_str(&line);
                captured.push('\n');
            } else if to_stderr {
                eprintln!("{line}");
            } else {
                println!("{line}");
            }
        }
        captured
    })
}

/// Run `command` through the shell in `cwd`.
///
/// stderr is always forwarded to the terminal. stdout is forwarded unless
/// `capture_stdout` is set, in which case it is returned in
/// [`CommandOutput::stdout`]. A non-zero exit status is *not* an error here;
/// callers decide.
pub async fn run_command(
    command: &str,
    cwd: &Path,
    capture_stdout: bool,
) -> Result<CommandOutput, ActionError> {
    debug!(cmd = %command, cwd = ?cwd, "spawning command");

    let mut child = shell(command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("spawning `{command}`"))?;

    let stdout = child.stdout.take().map(|s| pump(s, false, capture_stdout));
    let stderr = child.stderr.take().map(|s| pump(s, true, false));

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for `{command}`"))?;

    let captured = match stdout {
        Some(handle) => handle.await.context("reading command stdout")?,
        None => String::new(),
    };
    if let Some(handle) = stderr {
        handle.await.context("reading command stderr")?;
    }

    let code = status.code().unwrap_or(-1);
    debug!(cmd = %command, exit_code = code, success = status.success(), "command exited");

    Ok(CommandOutput {
        code,
        success: status.success(),
        stdout: captured,
    })
}

/// Runs a shell command line; a non-zero exit fails the task.
#[derive(Debug, Clone)]
pub struct CommandAction {
    command: String,
    cwd: PathBuf,
}

impl CommandAction {
    pub fn new(command: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            cwd: cwd.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Action for CommandAction {
    fn run<'a>(&'a self, ctx: &'a TaskContext) -> ActionFuture<'a> {
        Box::pin(async move {
            info!(task = %ctx.task(), run_id = ctx.run_id(), cmd = %self.command, "running command");
            let output = run_command(&self.command, &self.cwd, false).await?;
            if output.success {
                Ok(())
            } else {
                Err(ActionError::CommandFailed {
                    command: self.command.clone(),
                    code: output.code,
                })
            }
        })
    }

    fn describe(&self) -> String {
        format!("run `{}`", self.command)
    }
}
