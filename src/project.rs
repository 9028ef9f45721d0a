// src/project.rs

//! The task graph and watch bindings of the offline e-reader project.

use std::path::Path;
use std::sync::Arc;

use crate::config::ConfigFile;
use crate::dag::TaskRegistry;
use crate::errors::{ConfigError, Result};
use crate::exec::{
    CleanAction, CommandAction, CopyFilesAction, GenerateServiceWorkerAction, LintAction,
    ServeAction, WatchAction,
};
use crate::fs::FileSystem;
use crate::watch::{DispatchOptions, PathFilter, WatchBinding};

pub mod tasks {
    pub const BABEL: &str = "babel";
    pub const BOWER: &str = "bower";
    pub const BUILD: &str = "build";
    pub const CLEAN: &str = "clean";
    pub const COPY_SRC_FILES: &str = "copy-src-files";
    pub const GH_PAGES: &str = "gh-pages";
    pub const SERVE_DEV: &str = "serve:dev";
    pub const WATCH: &str = "watch";
    pub const LINT: &str = "lint";
    pub const GENERATE_SERVICE_WORKER: &str = "generate-service-worker";
    pub const DEFAULT: &str = "default";
}

use self::tasks::*;

/// File patterns that re-run tasks while `watch` is active.
pub fn default_watch_bindings(cfg: &ConfigFile) -> Vec<WatchBinding> {
    vec![
        WatchBinding::new(["bower.json"], [BOWER]),
        WatchBinding::new([cfg.js_glob()], [BABEL]),
        WatchBinding::new(cfg.src_file_globs(), [COPY_SRC_FILES])
            .excluding(cfg.src_file_excludes()),
    ]
}

/// Register every project task. `root` must be the project root; all
/// commands run there and all configured paths are resolved against it.
pub fn build_registry(
    cfg: &ConfigFile,
    root: &Path,
    fs: Arc<dyn FileSystem>,
) -> Result<TaskRegistry> {
    let mut registry = TaskRegistry::new();
    let dev_dir = root.join(&cfg.paths.dev_dir);

    registry.register_action(BABEL, no_deps(), CommandAction::new(&cfg.commands.babel, root))?;
    registry.register_action(BOWER, no_deps(), CommandAction::new(&cfg.commands.bower, root))?;
    registry.register_composite(
        BUILD,
        [BOWER, BABEL, COPY_SRC_FILES, GENERATE_SERVICE_WORKER],
    )?;
    registry.register_action(CLEAN, no_deps(), CleanAction::new(Arc::clone(&fs), &dev_dir))?;

    let copy_filter = PathFilter::new(&cfg.src_file_globs(), &cfg.src_file_excludes())
        .map_err(|e| ConfigError::Invalid(format!("source file globs: {e:#}")))?;
    registry.register_action(
        COPY_SRC_FILES,
        no_deps(),
        CopyFilesAction::new(
            Arc::clone(&fs),
            root,
            cfg.paths.src_dir.clone(),
            cfg.paths.dev_dir.clone(),
            copy_filter,
        ),
    )?;

    registry.register_action(
        GH_PAGES,
        [BUILD],
        CommandAction::new(&cfg.commands.publish, root),
    )?;
    registry.register_action(
        SERVE_DEV,
        [WATCH],
        ServeAction::new(&dev_dir, cfg.server.host.clone(), cfg.server.port),
    )?;
    registry.register_action(
        WATCH,
        [BUILD],
        WatchAction::new(
            root,
            default_watch_bindings(cfg),
            DispatchOptions {
                behaviour: cfg.watch.triggered_while_running_behaviour,
                queue_length: cfg.watch.queue_length,
            },
        ),
    )?;
    registry.register_action(LINT, no_deps(), LintAction::new(&cfg.commands.lint, root))?;
    registry.register_action(
        GENERATE_SERVICE_WORKER,
        no_deps(),
        GenerateServiceWorkerAction::new(
            fs,
            root,
            cfg.service_worker.clone(),
            cfg.service_worker_path(),
        ),
    )?;
    registry.register_composite(DEFAULT, [SERVE_DEV])?;

    registry.validate()?;
    Ok(registry)
}

fn no_deps() -> [&'static str; 0] {
    []
}
