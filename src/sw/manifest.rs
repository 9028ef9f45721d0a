// src/sw/manifest.rs

//! Precache manifest collection and service-worker script rendering.

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, info};

use crate::fs::FileSystem;
use crate::sw::revision::content_revision;
use crate::sw::ServiceWorkerConfig;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::{collect_matching_files, PathFilter};

/// A single precached file: the URL it is served under and its content
/// revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecacheEntry {
    pub url: String,
    pub revision: String,
}

/// Everything needed to render a service worker.
#[derive(Debug, Clone)]
pub struct ServiceWorkerManifest {
    pub entries: Vec<PrecacheEntry>,
    pub config: ServiceWorkerConfig,
}

/// Collect precache entries for `cfg` under `root`.
///
/// `output` (the service-worker file itself, relative to `root`) is never
/// precached. Entries are sorted by URL so the generated script is stable.
pub fn build_manifest(
    fs: &dyn FileSystem,
    root: &Path,
    cfg: &ServiceWorkerConfig,
    output: &Path,
) -> Result<ServiceWorkerManifest> {
    let filter = PathFilter::new(&cfg.static_file_globs, &[])
        .context("building static_file_globs matcher")?;
    let output_rel = output.to_string_lossy().replace('\\', "/");

    let mut entries = Vec::new();
    for path in collect_matching_files(fs, root, &filter)? {
        let Some(rel) = relative_str(root, &path) else {
            continue;
        };
        if rel == output_rel {
            continue;
        }
        let url = rel
            .strip_prefix(cfg.strip_prefix.as_str())
            .unwrap_or(rel.as_str())
            .to_string();
        let revision = content_revision(fs, &path)?;
        debug!(url = %url, revision = %revision, "precache entry");
        entries.push(PrecacheEntry { url, revision });
    }
    entries.sort_by(|a, b| a.url.cmp(&b.url));

    Ok(ServiceWorkerManifest {
        entries,
        config: cfg.clone(),
    })
}

/// Build the manifest and write the rendered script to `root/output`.
pub fn write_service_worker(
    fs: &dyn FileSystem,
    root: &Path,
    cfg: &ServiceWorkerConfig,
    output: &Path,
) -> Result<ServiceWorkerManifest> {
    let manifest = build_manifest(fs, root, cfg, output)?;
    let script = manifest.render()?;
    let target = root.join(output);
    fs.write(&target, script.as_bytes())?;
    info!(
        path = ?target,
        precached = manifest.entries.len(),
        runtime_rules = manifest.config.runtime_caching.len(),
        "wrote service worker"
    );
    Ok(manifest)
}

impl ServiceWorkerManifest {
    /// Render the service-worker script.
    ///
    /// Fails if any configured pattern is not a valid regular expression.
    pub fn render(&self) -> Result<String> {
        let cfg = &self.config;
        let mut out = String::new();

        out.push_str("'use strict';\n\n");
        out.push_str("// Generated by taskgraph. Do not edit.\n\n");

        out.push_str("var precacheConfig = [");
        for (idx, entry) in self.entries.iter().enumerate() {
            if idx > 0 {
                out.push(',');
            }
            out.push_str(&format!(
                "\n  [{}, {}]",
                js_string(&entry.url),
                js_string(&entry.revision)
            ));
        }
        if !self.entries.is_empty() {
            out.push('\n');
        }
        out.push_str("];\n");

        out.push_str(&format!(
            "var cacheName = 'taskgraph-precache-v1-' + {} + '-' + (self.registration ? self.registration.scope : '');\n",
            js_string(&cfg.cache_id)
        ));

        let ignore = cfg
            .ignore_url_parameters_matching
            .iter()
            .map(|p| js_regex_literal(p))
            .collect::<Result<Vec<_>>>()?;
        out.push_str(&format!(
            "var ignoreUrlParametersMatching = [{}];\n",
            ignore.join(", ")
        ));

        out.push_str("var runtimeCaching = [");
        for (idx, rule) in cfg.runtime_caching.iter().enumerate() {
            if idx > 0 {
                out.push(',');
            }
            let pattern = js_regex_literal(&rule.url_pattern)?;
            let cache = match &rule.cache {
                Some(c) => format!(
                    ", cache: {{name: {}, maxEntries: {}}}",
                    js_string(&c.name),
                    c.max_entries
                ),
                None => String::new(),
            };
            out.push_str(&format!(
                "\n  {{urlPattern: {pattern}, handler: {}{cache}}}",
                js_string(rule.handler.as_str())
            ));
        }
        if !cfg.runtime_caching.is_empty() {
            out.push('\n');
        }
        out.push_str("];\n\n");

        out.push_str(WORKER_BODY);
        Ok(out)
    }
}

/// Quote `s` as a JavaScript string literal.
fn js_string(s: &str) -> String {
    // JSON string literals are valid JavaScript string literals.
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Turn a regular expression into a JavaScript regex literal, escaping bare
/// forward slashes. The pattern is validated with the `regex` crate first.
pub fn js_regex_literal(pattern: &str) -> Result<String> {
    Regex::new(pattern).with_context(|| format!("invalid regular expression: {pattern}"))?;

    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('/');
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push('\\');
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '/' => out.push_str("\\/"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('/');
    Ok(out)
}

const WORKER_BODY: &str = r#"var hashParamName = '_sw-precache';

function stripIgnoredUrlParameters(originalUrl, ignorePatterns) {
  var url = new URL(originalUrl);
  url.hash = '';
  url.search = url.search.slice(1)
    .split('&')
    .filter(function(kv) { return kv.length > 0; })
    .filter(function(kv) {
      var name = kv.split('=')[0];
      return ignorePatterns.every(function(re) { return !re.test(name); });
    })
    .join('&');
  return url.toString();
}

var urlsToCacheKeys = new Map(precacheConfig.map(function(item) {
  var absoluteUrl = new URL(item[0], self.location).toString();
  var cacheKey = new URL(absoluteUrl);
  cacheKey.searchParams.set(hashParamName, item[1]);
  return [absoluteUrl, cacheKey.toString()];
}));

self.addEventListener('install', function(event) {
  event.waitUntil(
    caches.open(cacheName).then(function(cache) {
      return cache.keys().then(function(requests) {
        var cached = new Set(requests.map(function(request) { return request.url; }));
        return Promise.all(Array.from(urlsToCacheKeys.entries()).map(function(entry) {
          var url = entry[0];
          var cacheKey = entry[1];
          if (cached.has(cacheKey)) {
            return null;
          }
          return fetch(new Request(url, {credentials: 'same-origin'})).then(function(response) {
            if (!response.ok) {
              throw new Error('Request for ' + url + ' returned status ' + response.status);
            }
            return cache.put(cacheKey, response);
          });
        }));
      });
    }).then(function() {
      return self.skipWaiting();
    })
  );
});

self.addEventListener('activate', function(event) {
  var expected = new Set(urlsToCacheKeys.values());
  event.waitUntil(
    caches.open(cacheName).then(function(cache) {
      return cache.keys().then(function(requests) {
        return Promise.all(requests.map(function(request) {
          return expected.has(request.url) ? null : cache.delete(request);
        }));
      });
    }).then(function() {
      return self.clients.claim();
    })
  );
});

function runtimeCacheName(rule) {
  return rule.cache ? rule.cache.name : cacheName + '-runtime';
}

function trimCache(name, maxEntries) {
  return caches.open(name).then(function(cache) {
    return cache.keys().then(function(requests) {
      var excess = requests.slice(0, Math.max(0, requests.length - maxEntries));
      return Promise.all(excess.map(function(request) { return cache.delete(request); }));
    });
  });
}

function fetchAndCache(request, rule) {
  return fetch(request.clone()).then(function(response) {
    if (response.ok || response.type === 'opaque') {
      var copy = response.clone();
      caches.open(runtimeCacheName(rule)).then(function(cache) {
        return cache.put(request, copy);
      }).then(function() {
        return rule.cache ? trimCache(rule.cache.name, rule.cache.maxEntries) : null;
      });
    }
    return response;
  });
}

function cacheFirst(request, rule) {
  return caches.open(runtimeCacheName(rule)).then(function(cache) {
    return cache.match(request);
  }).then(function(response) {
    return response || fetchAndCache(request, rule);
  });
}

function fastest(request, rule) {
  return new Promise(function(resolve, reject) {
    var rejected = false;
    var fail = function(error) {
      if (rejected) {
        reject(error);
      } else {
        rejected = true;
      }
    };
    fetchAndCache(request, rule).then(resolve, fail);
    caches.open(runtimeCacheName(rule)).then(function(cache) {
      return cache.match(request);
    }).then(function(response) {
      if (response) {
        resolve(response);
      } else {
        fail(new Error('No cached response for ' + request.url));
      }
    }, fail);
  });
}

var handlers = {cacheFirst: cacheFirst, fastest: fastest};

self.addEventListener('fetch', function(event) {
  if (event.request.method !== 'GET') {
    return;
  }

  var url = stripIgnoredUrlParameters(event.request.url, ignoreUrlParametersMatching);
  if (!urlsToCacheKeys.has(url) && url.endsWith('/')) {
    url = url + 'index.html';
  }
  if (urlsToCacheKeys.has(url)) {
    var cacheKey = urlsToCacheKeys.get(url);
    event.respondWith(
      caches.open(cacheName).then(function(cache) {
        return cache.match(cacheKey);
      }).then(function(response) {
        return response || fetch(event.request);
      })
    );
    return;
  }

  for (var i = 0; i < runtimeCaching.length; i++) {
    var rule = runtimeCaching[i];
    if (rule.urlPattern.test(event.request.url)) {
      event.respondWith(handlers[rule.handler](event.request, rule));
      return;
    }
  }
});
"#;
