// src/watch/watcher.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::info;

/// Handle for the filesystem watcher.
///
/// Dropping this handle stops file watching.
pub struct WatcherHandle {
    root: PathBuf,
    _inner: RecommendedWatcher,
}

impl WatcherHandle {
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// Start watching `root` recursively.
///
/// Every created, modified or removed path is forwarded on the returned
/// channel as an absolute path. Access events are dropped.
pub fn spawn_watcher(root: &Path) -> Result<(WatcherHandle, mpsc::UnboundedReceiver<PathBuf>)> {
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

    // Channel from the blocking notify callback into the async world.
    let (path_tx, path_rx) = mpsc::unbounded_channel::<PathBuf>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if !is_content_change(&event.kind) {
                    return;
                }
                for path in event.paths {
                    if let Err(err) = path_tx.send(path) {
                        // Not inside the tokio runtime here; fall back to stderr.
                        eprintln!("taskgraph: failed to forward file event: {err}");
                    }
                }
            }
            Err(err) => {
                eprintln!("taskgraph: file watch error: {err}");
            }
        },
        Config::default(),
    )
    .context("creating filesystem watcher")?;

    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("watching {:?}", root))?;

    info!("file watcher started on {:?}", root);

    Ok((
        WatcherHandle {
            root,
            _inner: watcher,
        },
        path_rx,
    ))
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
    )
}
