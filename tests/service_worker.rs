mod common;

use std::path::Path;

use taskgraph::config::ConfigFile;
use taskgraph::fs::mock::MockFileSystem;
use taskgraph::sw::{
    build_manifest, content_revision, js_regex_literal, write_service_worker, NamedCache,
    ServiceWorkerConfig,
};
use taskgraph::types::CachingStrategy;

const ROOT: &str = "/proj";
const OUTPUT: &str = "dev/service-worker.js";

fn project_files() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/dev/index.html", "<html></html>");
    fs.add_file("/proj/dev/js/app.js", "console.log('reader');");
    fs.add_file("/proj/dev/css/reader.css", "body {}");
    fs.add_file("/proj/dev/img/cover.png", vec![0x89, 0x50, 0x4e, 0x47]);
    fs.add_file("/proj/dev/notes.txt", "not precached");
    fs.add_file("/proj/dev/service-worker.js", "// previous build");
    fs.add_file("/proj/src/index.html", "<html></html>");
    fs
}

#[test]
fn project_config_has_four_runtime_rules_in_order() {
    let cfg = ConfigFile::default().service_worker;

    let rules: Vec<(&str, CachingStrategy)> = cfg
        .runtime_caching
        .iter()
        .map(|r| (r.url_pattern.as_str(), r.handler))
        .collect();
    assert_eq!(
        rules,
        vec![
            (r"fonts\.gstatic\.com", CachingStrategy::CacheFirst),
            (r"Gitenberg%20Book%20List\.csv", CachingStrategy::Fastest),
            (r"^https://cdn\.rawgit\.com", CachingStrategy::CacheFirst),
            (r"imgeng\.in", CachingStrategy::CacheFirst),
        ]
    );

    assert_eq!(cfg.runtime_caching[0].cache, None);
    assert_eq!(cfg.runtime_caching[1].cache, None);
    assert_eq!(
        cfg.runtime_caching[2].cache,
        Some(NamedCache {
            name: "book-cache".to_string(),
            max_entries: 10
        })
    );
    assert_eq!(
        cfg.runtime_caching[3].cache,
        Some(NamedCache {
            name: "book-cover-cache".to_string(),
            max_entries: 50
        })
    );

    assert_eq!(cfg.cache_id, "offline-ereader");
    assert_eq!(cfg.strip_prefix, "dev/");
    assert_eq!(cfg.static_file_globs, vec!["dev/**/*.{html,js,css,png,jpg}"]);
    assert_eq!(cfg.ignore_url_parameters_matching, vec!["."]);
}

#[test]
fn manifest_lists_static_files_without_prefix() {
    let fs = project_files();
    let cfg = ServiceWorkerConfig::offline_ereader("dev");

    let manifest = build_manifest(&fs, Path::new(ROOT), &cfg, Path::new(OUTPUT)).unwrap();

    let urls: Vec<&str> = manifest.entries.iter().map(|e| e.url.as_str()).collect();
    assert_eq!(
        urls,
        vec!["css/reader.css", "img/cover.png", "index.html", "js/app.js"]
    );
    for entry in &manifest.entries {
        assert_eq!(entry.revision.len(), 64, "blake3 hex digest");
    }
}

#[test]
fn revision_follows_file_content() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/a.js", "same");
    fs.add_file("/proj/b.js", "same");
    fs.add_file("/proj/c.js", "different");

    let a = content_revision(&fs, Path::new("/proj/a.js")).unwrap();
    let b = content_revision(&fs, Path::new("/proj/b.js")).unwrap();
    let c = content_revision(&fs, Path::new("/proj/c.js")).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn generated_script_contains_precache_and_runtime_routes() {
    let fs = project_files();
    let cfg = ServiceWorkerConfig::offline_ereader("dev");

    let manifest = write_service_worker(&fs, Path::new(ROOT), &cfg, Path::new(OUTPUT)).unwrap();
    assert_eq!(manifest.entries.len(), 4);

    let bytes = fs.file_contents("/proj/dev/service-worker.js").unwrap();
    let script = String::from_utf8(bytes).unwrap();

    assert!(script.contains("\"index.html\""));
    assert!(script.contains("\"js/app.js\""));
    assert!(!script.contains("notes.txt"));
    assert!(!script.contains("\"service-worker.js\""));
    assert!(script.contains("\"offline-ereader\""));
    assert!(script.contains(r"/^https:\/\/cdn\.rawgit\.com/"));
    assert!(script.contains(r"/fonts\.gstatic\.com/"));
    assert!(script.contains("cache: {name: \"book-cache\", maxEntries: 10}"));
    assert!(script.contains("cache: {name: \"book-cover-cache\", maxEntries: 50}"));
    assert!(script.contains("handler: \"fastest\""));

    let rawgit = script.find("cdn").unwrap();
    let imgeng = script.find("imgeng").unwrap();
    let fonts = script.find("fonts").unwrap();
    assert!(fonts < rawgit && rawgit < imgeng);
}

#[test]
fn regex_literals_escape_slashes_and_reject_invalid_patterns() {
    assert_eq!(js_regex_literal(r"imgeng\.in").unwrap(), r"/imgeng\.in/");
    assert_eq!(js_regex_literal("a/b").unwrap(), r"/a\/b/");
    assert_eq!(js_regex_literal(r"a\/b").unwrap(), r"/a\/b/");
    assert!(js_regex_literal("(unclosed").is_err());
}

#[test]
fn empty_output_directory_yields_empty_precache() {
    let fs = MockFileSystem::new();
    let cfg = ServiceWorkerConfig::offline_ereader("dev");

    let manifest = build_manifest(&fs, Path::new(ROOT), &cfg, Path::new(OUTPUT)).unwrap();
    assert!(manifest.entries.is_empty());

    let script = manifest.render().unwrap();
    assert!(script.contains("var precacheConfig = [];"));
}
