// src/sw/mod.rs

//! Service-worker generation.
//!
//! - [`ServiceWorkerConfig`] is the configuration surface: which static files
//!   to precache and how runtime requests are cached.
//! - [`manifest`] collects the precache entries and renders the script.
//! - [`revision`] computes per-file content revisions.

use serde::Deserialize;

use crate::types::CachingStrategy;

pub mod manifest;
pub mod revision;

pub use manifest::{
    build_manifest, js_regex_literal, write_service_worker, PrecacheEntry, ServiceWorkerManifest,
};
pub use revision::content_revision;

/// A named runtime cache with an upper bound on stored responses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedCache {
    pub name: String,
    pub max_entries: usize,
}

/// One runtime caching rule. Rules are evaluated in order; the first whose
/// `url_pattern` matches a request decides its strategy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuntimeCachingRule {
    /// Regular expression matched against the full request URL.
    pub url_pattern: String,
    pub handler: CachingStrategy,
    #[serde(default)]
    pub cache: Option<NamedCache>,
}

impl RuntimeCachingRule {
    pub fn new(url_pattern: impl Into<String>, handler: CachingStrategy) -> Self {
        Self {
            url_pattern: url_pattern.into(),
            handler,
            cache: None,
        }
    }

    pub fn with_cache(mut self, name: impl Into<String>, max_entries: usize) -> Self {
        self.cache = Some(NamedCache {
            name: name.into(),
            max_entries,
        });
        self
    }
}

/// Options for the generated service worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceWorkerConfig {
    /// Globs, relative to the project root, of files to precache.
    pub static_file_globs: Vec<String>,
    pub runtime_caching: Vec<RuntimeCachingRule>,
    /// Identifier mixed into the precache name.
    pub cache_id: String,
    /// Prefix removed from file paths to form the cached URL.
    pub strip_prefix: String,
    /// Query parameters whose names match any of these regexes are ignored
    /// when looking up precached URLs.
    pub ignore_url_parameters_matching: Vec<String>,
}

impl ServiceWorkerConfig {
    /// The e-reader's configuration for an output directory `dev_dir`.
    ///
    /// Fonts and book covers are cached on first use, the book list is served
    /// from whichever of cache and network answers first, and book texts and
    /// covers live in their own bounded caches.
    pub fn offline_ereader(dev_dir: &str) -> Self {
        let dev = dev_dir.trim_end_matches('/');
        Self {
            static_file_globs: vec![format!("{dev}/**/*.{{html,js,css,png,jpg}}")],
            runtime_caching: vec![
                RuntimeCachingRule::new(r"fonts\.gstatic\.com", CachingStrategy::CacheFirst),
                RuntimeCachingRule::new(r"Gitenberg%20Book%20List\.csv", CachingStrategy::Fastest),
                RuntimeCachingRule::new(r"^https://cdn\.rawgit\.com", CachingStrategy::CacheFirst)
                    .with_cache("book-cache", 10),
                RuntimeCachingRule::new(r"imgeng\.in", CachingStrategy::CacheFirst)
                    .with_cache("book-cover-cache", 50),
            ],
            cache_id: "offline-ereader".to_string(),
            strip_prefix: format!("{dev}/"),
            ignore_url_parameters_matching: vec![".".to_string()],
        }
    }
}
