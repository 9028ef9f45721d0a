// src/exec/files.rs

//! Actions that touch the project tree directly: `clean` and
//! `copy-src-files`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::errors::ActionError;
use crate::exec::action::{Action, ActionFuture, TaskContext};
use crate::fs::FileSystem;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::{collect_matching_files, PathFilter};

/// Remove `dir` and everything below it. Missing is fine.
pub fn clean_dir(fs: &dyn FileSystem, dir: &Path) -> Result<bool> {
    let removed = fs.remove_dir_all(dir)?;
    if removed {
        info!(dir = ?dir, "removed output directory");
    } else {
        debug!(dir = ?dir, "output directory did not exist");
    }
    Ok(removed)
}

/// Copy every file under `root` matched by `filter` from `src_dir` into
/// `dest_dir`, keeping its path relative to `src_dir`.
///
/// Returns the number of files copied.
pub fn copy_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    src_dir: &str,
    dest_dir: &str,
    filter: &PathFilter,
) -> Result<usize> {
    let src_prefix = format!("{}/", src_dir.trim_end_matches('/'));
    let mut copied = 0;

    for path in collect_matching_files(fs, root, filter)? {
        let Some(rel) = relative_str(root, &path) else {
            continue;
        };
        let within = rel.strip_prefix(src_prefix.as_str()).unwrap_or(rel.as_str());
        let target = root.join(dest_dir).join(within);
        fs.copy(&path, &target)
            .with_context(|| format!("copying {rel} to {dest_dir}"))?;
        debug!(from = %rel, to = ?target, "copied");
        copied += 1;
    }

    Ok(copied)
}

async fn blocking<T, F>(f: F) -> Result<T, ActionError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let value = tokio::task::spawn_blocking(f)
        .await
        .context("filesystem task panicked")??;
    Ok(value)
}

/// Deletes the generated output directory.
#[derive(Debug, Clone)]
pub struct CleanAction {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
}

impl CleanAction {
    pub fn new(fs: Arc<dyn FileSystem>, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }
}

impl Action for CleanAction {
    fn run<'a>(&'a self, _ctx: &'a TaskContext) -> ActionFuture<'a> {
        Box::pin(async move {
            let fs = Arc::clone(&self.fs);
            let dir = self.dir.clone();
            blocking(move || clean_dir(fs.as_ref(), &dir)).await?;
            Ok(())
        })
    }

    fn describe(&self) -> String {
        format!("remove {}", self.dir.display())
    }
}

/// Copies non-script source files into the output directory.
#[derive(Debug, Clone)]
pub struct CopyFilesAction {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    src_dir: String,
    dest_dir: String,
    filter: Arc<PathFilter>,
}

impl CopyFilesAction {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        root: impl Into<PathBuf>,
        src_dir: impl Into<String>,
        dest_dir: impl Into<String>,
        filter: PathFilter,
    ) -> Self {
        Self {
            fs,
            root: root.into(),
            src_dir: src_dir.into(),
            dest_dir: dest_dir.into(),
            filter: Arc::new(filter),
        }
    }
}

impl Action for CopyFilesAction {
    fn run<'a>(&'a self, ctx: &'a TaskContext) -> ActionFuture<'a> {
        Box::pin(async move {
            let fs = Arc::clone(&self.fs);
            let root = self.root.clone();
            let src = self.src_dir.clone();
            let dest = self.dest_dir.clone();
            let filter = Arc::clone(&self.filter);

            let copied = blocking(move || {
                copy_matching_files(fs.as_ref(), &root, &src, &dest, &filter)
            })
            .await?;

            info!(task = %ctx.task(), copied, dest = %self.dest_dir, "copied source files");
            Ok(())
        })
    }

    fn describe(&self) -> String {
        format!("copy {} -> {}", self.src_dir, self.dest_dir)
    }
}
