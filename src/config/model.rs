// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::sw::{RuntimeCachingRule, ServiceWorkerConfig};
use crate::types::TriggerWhileRunningBehaviour;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [paths]
/// src_dir = "src"
/// dev_dir = "dev"
///
/// [server]
/// port = 8080
///
/// [watch]
/// triggered_while_running_behaviour = "queue"
///
/// [commands]
/// bower = "bower install"
///
/// [service_worker]
/// cache_id = "offline-ereader"
/// ```
///
/// All sections are optional. Values that depend on other sections (e.g.
/// default commands that mention `dev_dir`) stay `None` here and are filled
/// in when converting into a [`ConfigFile`].
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub commands: RawCommandsSection,

    #[serde(default)]
    pub service_worker: RawServiceWorkerSection,
}

/// Validated configuration with every default resolved.
///
/// Construct through `ConfigFile::try_from(raw)` (or [`ConfigFile::default`]).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub paths: PathsSection,
    pub server: ServerSection,
    pub watch: WatchSection,
    pub commands: CommandsSection,
    pub service_worker: ServiceWorkerConfig,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        let commands = raw.commands.resolve(&raw.paths);
        let service_worker = raw.service_worker.resolve(&raw.paths);
        Self {
            paths: raw.paths,
            server: raw.server,
            watch: raw.watch,
            commands,
            service_worker,
        }
    }

    /// Glob (relative to the project root) matching every source JS file.
    pub fn js_glob(&self) -> String {
        format!("{}/js/**/*.js", self.paths.src_dir)
    }

    /// Globs matching the non-JS sources copied verbatim into `dev_dir`:
    /// dotted files at the top of `src_dir` plus everything in its
    /// subdirectories. Extensionless top-level files (`src/CNAME`) stay put.
    pub fn src_file_globs(&self) -> Vec<String> {
        vec![
            format!("{}/*.*", self.paths.src_dir),
            format!("{}/*/**/*", self.paths.src_dir),
        ]
    }

    /// Globs excluded from [`Self::src_file_globs`].
    pub fn src_file_excludes(&self) -> Vec<String> {
        vec![format!("{}/js/**", self.paths.src_dir)]
    }

    /// Path of the generated service worker, relative to the project root.
    pub fn service_worker_path(&self) -> PathBuf {
        Path::new(&self.paths.dev_dir).join("service-worker.js")
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        ConfigFile::new_unchecked(RawConfigFile::default())
    }
}

/// `[paths]` section. Both directories are relative to the project root.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    #[serde(default = "default_src_dir")]
    pub src_dir: String,

    /// Output directory for transpiled and copied files.
    #[serde(default = "default_dev_dir")]
    pub dev_dir: String,
}

fn default_src_dir() -> String {
    "src".to_string()
}

fn default_dev_dir() -> String {
    "dev".to_string()
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            dev_dir: default_dev_dir(),
        }
    }
}

/// `[server]` section for `serve:dev`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// `[watch]` section.
///
/// Controls what happens when file events arrive while a watch-triggered run
/// is still executing.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// `"queue"` (default) or `"cancel"`.
    #[serde(default)]
    pub triggered_while_running_behaviour: TriggerWhileRunningBehaviour,

    /// Maximum number of queued trigger batches to remember.
    #[serde(default = "default_queue_length")]
    pub queue_length: usize,
}

fn default_queue_length() -> usize {
    1
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            triggered_while_running_behaviour: TriggerWhileRunningBehaviour::default(),
            queue_length: default_queue_length(),
        }
    }
}

/// `[commands]` section as written in the file.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCommandsSection {
    #[serde(default)]
    pub babel: Option<String>,
    #[serde(default)]
    pub bower: Option<String>,
    #[serde(default)]
    pub lint: Option<String>,
    #[serde(default)]
    pub publish: Option<String>,
}

impl RawCommandsSection {
    fn resolve(&self, paths: &PathsSection) -> CommandsSection {
        let defaults = CommandsSection::defaults_for(paths);
        CommandsSection {
            babel: self.babel.clone().unwrap_or(defaults.babel),
            bower: self.bower.clone().unwrap_or(defaults.bower),
            lint: self.lint.clone().unwrap_or(defaults.lint),
            publish: self.publish.clone().unwrap_or(defaults.publish),
        }
    }
}

/// Shell command lines for the tasks that delegate to external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandsSection {
    /// Transpiles `<src_dir>/js` into `<dev_dir>/js`.
    pub babel: String,
    /// Installs third-party front-end dependencies.
    pub bower: String,
    /// Style checker; must print an ESLint-compatible JSON report on stdout.
    pub lint: String,
    /// Publishes `<dev_dir>` to the static host branch.
    pub publish: String,
}

impl CommandsSection {
    pub fn defaults_for(paths: &PathsSection) -> Self {
        let src = &paths.src_dir;
        let dev = &paths.dev_dir;
        Self {
            babel: format!("npx babel {src}/js --out-dir {dev}/js"),
            bower: "bower install".to_string(),
            lint: format!("npx eslint --format json {src}/js"),
            publish: format!("npx gh-pages --dist {dev}"),
        }
    }
}

/// `[service_worker]` section as written in the file.
///
/// Anything left out falls back to [`ServiceWorkerConfig::offline_ereader`]
/// for the configured `dev_dir`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServiceWorkerSection {
    #[serde(default)]
    pub static_file_globs: Option<Vec<String>>,
    #[serde(default)]
    pub runtime_caching: Option<Vec<RuntimeCachingRule>>,
    #[serde(default)]
    pub cache_id: Option<String>,
    #[serde(default)]
    pub strip_prefix: Option<String>,
    #[serde(default)]
    pub ignore_url_parameters_matching: Option<Vec<String>>,
}

impl RawServiceWorkerSection {
    fn resolve(&self, paths: &PathsSection) -> ServiceWorkerConfig {
        let mut cfg = ServiceWorkerConfig::offline_ereader(&paths.dev_dir);
        if let Some(globs) = &self.static_file_globs {
            cfg.static_file_globs = globs.clone();
        }
        if let Some(rules) = &self.runtime_caching {
            cfg.runtime_caching = rules.clone();
        }
        if let Some(id) = &self.cache_id {
            cfg.cache_id = id.clone();
        }
        if let Some(prefix) = &self.strip_prefix {
            cfg.strip_prefix = prefix.clone();
        }
        if let Some(ignore) = &self.ignore_url_parameters_matching {
            cfg.ignore_url_parameters_matching = ignore.clone();
        }
        cfg
    }
}
