// src/exec/serve.rs

//! Local development server for the output directory.

use std::path::PathBuf;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::errors::ActionError;
use crate::exec::action::{Action, ActionFuture, TaskContext};

/// Router serving static files from `dir`, with `index.html` for directories.
pub fn static_router(dir: impl Into<PathBuf>) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(dir.into()).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
}

/// Serve `dir` on an already bound listener until the server fails.
pub async fn serve_dir(listener: TcpListener, dir: impl Into<PathBuf>) -> Result<(), ActionError> {
    axum::serve(listener, static_router(dir))
        .await
        .context("static file server stopped")?;
    Ok(())
}

/// Long-lived task: serves the output directory over HTTP.
///
/// Never completes on its own; the run it belongs to stays open until the
/// process is interrupted.
#[derive(Debug, Clone)]
pub struct ServeAction {
    dir: PathBuf,
    host: String,
    port: u16,
}

impl ServeAction {
    pub fn new(dir: impl Into<PathBuf>, host: impl Into<String>, port: u16) -> Self {
        Self {
            dir: dir.into(),
            host: host.into(),
            port,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Action for ServeAction {
    fn run<'a>(&'a self, ctx: &'a TaskContext) -> ActionFuture<'a> {
        Box::pin(async move {
            let addr = self.address();
            let listener = TcpListener::bind(&addr)
                .await
                .with_context(|| format!("binding dev server to {addr}"))?;
            info!(task = %ctx.task(), dir = ?self.dir, "serving on http://{addr}");
            serve_dir(listener, self.dir.clone()).await
        })
    }

    fn describe(&self) -> String {
        format!("serve {} on {}", self.dir.display(), self.address())
    }
}
