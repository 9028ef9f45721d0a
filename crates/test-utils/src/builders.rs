#![allow(dead_code)]

use taskgraph::config::{ConfigFile, RawConfigFile};
use taskgraph::sw::RuntimeCachingRule;
use taskgraph::types::TriggerWhileRunningBehaviour;

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the built-in defaults; every `with_*` call overrides one
/// value the way the corresponding TOML key would.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_dirs(mut self, src_dir: &str, dev_dir: &str) -> Self {
        self.config.paths.src_dir = src_dir.to_string();
        self.config.paths.dev_dir = dev_dir.to_string();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_behaviour(mut self, behaviour: TriggerWhileRunningBehaviour) -> Self {
        self.config.watch.triggered_while_running_behaviour = behaviour;
        self
    }

    pub fn with_queue_length(mut self, len: usize) -> Self {
        self.config.watch.queue_length = len;
        self
    }

    pub fn with_babel(mut self, cmd: &str) -> Self {
        self.config.commands.babel = Some(cmd.to_string());
        self
    }

    pub fn with_bower(mut self, cmd: &str) -> Self {
        self.config.commands.bower = Some(cmd.to_string());
        self
    }

    pub fn with_lint(mut self, cmd: &str) -> Self {
        self.config.commands.lint = Some(cmd.to_string());
        self
    }

    pub fn with_publish(mut self, cmd: &str) -> Self {
        self.config.commands.publish = Some(cmd.to_string());
        self
    }

    pub fn with_cache_id(mut self, id: &str) -> Self {
        self.config.service_worker.cache_id = Some(id.to_string());
        self
    }

    pub fn with_runtime_caching(mut self, rules: Vec<RuntimeCachingRule>) -> Self {
        self.config.service_worker.runtime_caching = Some(rules);
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
