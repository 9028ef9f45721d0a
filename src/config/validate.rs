// src/config/validate.rs

use globset::Glob;
use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{ConfigError, Result, TaskGraphError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TaskGraphError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let config = ConfigFile::new_unchecked(raw);
        validate_config(&config)?;
        Ok(config)
    }
}

/// Validate a resolved configuration.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_paths(cfg)?;
    validate_server(cfg)?;
    validate_watch(cfg)?;
    validate_commands(cfg)?;
    validate_service_worker(cfg)?;
    Ok(())
}

fn invalid(msg: impl Into<String>) -> TaskGraphError {
    TaskGraphError::Config(ConfigError::Invalid(msg.into()))
}

fn validate_paths(cfg: &ConfigFile) -> Result<()> {
    let src = cfg.paths.src_dir.trim_end_matches('/');
    let dev = cfg.paths.dev_dir.trim_end_matches('/');

    if src.is_empty() {
        return Err(invalid("[paths].src_dir must not be empty"));
    }
    if dev.is_empty() {
        return Err(invalid("[paths].dev_dir must not be empty"));
    }
    if src == dev {
        return Err(invalid(format!(
            "[paths].src_dir and [paths].dev_dir must differ (both are '{src}')"
        )));
    }
    Ok(())
}

fn validate_server(cfg: &ConfigFile) -> Result<()> {
    if cfg.server.port == 0 {
        return Err(invalid("[server].port must be >= 1 (got 0)"));
    }
    if cfg.server.host.trim().is_empty() {
        return Err(invalid("[server].host must not be empty"));
    }
    Ok(())
}

fn validate_watch(cfg: &ConfigFile) -> Result<()> {
    if cfg.watch.queue_length == 0 {
        return Err(invalid("[watch].queue_length must be >= 1 (got 0)"));
    }
    Ok(())
}

fn validate_commands(cfg: &ConfigFile) -> Result<()> {
    let commands = [
        ("babel", &cfg.commands.babel),
        ("bower", &cfg.commands.bower),
        ("lint", &cfg.commands.lint),
        ("publish", &cfg.commands.publish),
    ];
    for (name, cmd) in commands {
        if cmd.trim().is_empty() {
            return Err(invalid(format!("[commands].{name} must not be empty")));
        }
    }
    Ok(())
}

fn validate_service_worker(cfg: &ConfigFile) -> Result<()> {
    let sw = &cfg.service_worker;

    if sw.cache_id.trim().is_empty() {
        return Err(invalid("[service_worker].cache_id must not be empty"));
    }

    for pat in &sw.static_file_globs {
        Glob::new(pat).map_err(|e| {
            invalid(format!(
                "[service_worker].static_file_globs: invalid glob '{pat}': {e}"
            ))
        })?;
    }

    for pat in &sw.ignore_url_parameters_matching {
        Regex::new(pat).map_err(|e| {
            invalid(format!(
                "[service_worker].ignore_url_parameters_matching: invalid regex '{pat}': {e}"
            ))
        })?;
    }

    for (idx, rule) in sw.runtime_caching.iter().enumerate() {
        Regex::new(&rule.url_pattern).map_err(|e| {
            invalid(format!(
                "[service_worker].runtime_caching[{idx}]: invalid url_pattern '{}': {e}",
                rule.url_pattern
            ))
        })?;

        if let Some(cache) = &rule.cache {
            if cache.name.trim().is_empty() {
                return Err(invalid(format!(
                    "[service_worker].runtime_caching[{idx}]: cache name must not be empty"
                )));
            }
            if cache.max_entries == 0 {
                return Err(invalid(format!(
                    "[service_worker].runtime_caching[{idx}]: cache '{}' needs max_entries >= 1",
                    cache.name
                )));
            }
        }
    }

    Ok(())
}
