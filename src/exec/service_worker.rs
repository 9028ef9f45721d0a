// src/exec/service_worker.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::errors::ActionError;
use crate::exec::action::{Action, ActionFuture, TaskContext};
use crate::fs::FileSystem;
use crate::sw::{write_service_worker, ServiceWorkerConfig};

/// Writes the offline service worker into the output directory.
#[derive(Debug, Clone)]
pub struct GenerateServiceWorkerAction {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    config: ServiceWorkerConfig,
    /// Relative to `root`.
    output: PathBuf,
}

impl GenerateServiceWorkerAction {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        root: impl Into<PathBuf>,
        config: ServiceWorkerConfig,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fs,
            root: root.into(),
            config,
            output: output.into(),
        }
    }
}

impl Action for GenerateServiceWorkerAction {
    fn run<'a>(&'a self, _ctx: &'a TaskContext) -> ActionFuture<'a> {
        Box::pin(async move {
            let fs = Arc::clone(&self.fs);
            let root = self.root.clone();
            let config = self.config.clone();
            let output = self.output.clone();

            tokio::task::spawn_blocking(move || {
                write_service_worker(fs.as_ref(), &root, &config, &output)
            })
            .await
            .context("service worker generation panicked")??;
            Ok(())
        })
    }

    fn describe(&self) -> String {
        format!("write {}", self.output.display())
    }
}
