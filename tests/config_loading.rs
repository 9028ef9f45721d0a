// tests/config_loading.rs

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use taskgraph::config::{load_and_validate, load_or_default, ConfigFile};
use taskgraph::errors::{ConfigError, TaskGraphError};
use taskgraph::types::{CachingStrategy, TriggerWhileRunningBehaviour};
use taskgraph_test_utils::builders::ConfigFileBuilder;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn empty_file_yields_project_defaults() {
    let file = config_file("");
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.paths.src_dir, "src");
    assert_eq!(cfg.paths.dev_dir, "dev");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.watch.queue_length, 1);
    assert_eq!(
        cfg.watch.triggered_while_running_behaviour,
        TriggerWhileRunningBehaviour::Queue
    );
    assert_eq!(cfg.commands.bower, "bower install");
    assert_eq!(cfg.commands.babel, "npx babel src/js --out-dir dev/js");
    assert_eq!(cfg.service_worker, ConfigFile::default().service_worker);
}

#[test]
fn output_directory_flows_into_derived_defaults() {
    let file = config_file(
        r#"
[paths]
dev_dir = "public"

[server]
port = 3000
"#,
    );
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.server.port, 3000);
    assert_eq!(cfg.commands.babel, "npx babel src/js --out-dir public/js");
    assert_eq!(cfg.commands.publish, "npx gh-pages --dist public");
    assert_eq!(cfg.service_worker.strip_prefix, "public/");
    assert_eq!(
        cfg.service_worker_path(),
        Path::new("public").join("service-worker.js")
    );
}

#[test]
fn explicit_sections_override_defaults() {
    let file = config_file(
        r#"
[watch]
triggered_while_running_behaviour = "cancel"
queue_length = 3

[commands]
lint = "./node_modules/.bin/eslint -f json src/js"

[service_worker]
cache_id = "reader-beta"

[[service_worker.runtime_caching]]
url_pattern = "example\\.org"
handler = "fastest"

[[service_worker.runtime_caching]]
url_pattern = "^https://books\\."
handler = "cacheFirst"
cache = { name = "books", max_entries = 5 }
"#,
    );
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(
        cfg.watch.triggered_while_running_behaviour,
        TriggerWhileRunningBehaviour::Cancel
    );
    assert_eq!(cfg.watch.queue_length, 3);
    assert_eq!(cfg.commands.lint, "./node_modules/.bin/eslint -f json src/js");
    assert_eq!(cfg.commands.bower, "bower install");
    assert_eq!(cfg.service_worker.cache_id, "reader-beta");

    let rules = &cfg.service_worker.runtime_caching;
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].url_pattern, r"example\.org");
    assert_eq!(rules[0].handler, CachingStrategy::Fastest);
    assert_eq!(rules[1].cache.as_ref().unwrap().max_entries, 5);
    // Untouched keys keep the project values.
    assert_eq!(cfg.service_worker.strip_prefix, "dev/");
}

#[test]
fn unknown_behaviour_is_a_toml_error() {
    let file = config_file(
        r#"
[watch]
triggered_while_running_behaviour = "restart"
"#,
    );
    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, TaskGraphError::TomlError(_)), "got {err:?}");
}

#[test]
fn zero_port_is_rejected() {
    let file = config_file("[server]\nport = 0\n");
    let err = load_and_validate(file.path()).unwrap_err();

    match err {
        TaskGraphError::Config(ConfigError::Invalid(msg)) => assert!(msg.contains("port")),
        other => panic!("expected invalid config, got {other:?}"),
    }
}

#[test]
fn identical_source_and_output_directories_are_rejected() {
    let file = config_file("[paths]\nsrc_dir = \"site\"\ndev_dir = \"site/\"\n");
    let err = load_and_validate(file.path()).unwrap_err();
    assert!(err.is_config_error());
}

#[test]
fn invalid_runtime_pattern_is_rejected() {
    let file = config_file(
        r#"
[[service_worker.runtime_caching]]
url_pattern = "(unclosed"
handler = "cacheFirst"
"#,
    );
    let err = load_and_validate(file.path()).unwrap_err();
    assert!(err.is_config_error());
}

#[test]
fn named_cache_needs_entries() {
    let file = config_file(
        r#"
[[service_worker.runtime_caching]]
url_pattern = "books"
handler = "cacheFirst"
cache = { name = "books", max_entries = 0 }
"#,
    );
    assert!(load_and_validate(file.path()).unwrap_err().is_config_error());
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("Custom.toml");

    let err = load_or_default(&missing).unwrap_err();
    assert!(matches!(err, TaskGraphError::IoError(_)));
}

#[test]
fn builder_rejects_zero_queue_length() {
    let raw = ConfigFileBuilder::new().with_queue_length(0).raw();
    assert!(ConfigFile::try_from(raw).is_err());
}

#[test]
fn builder_overrides_commands() {
    let cfg = ConfigFileBuilder::new()
        .with_dirs("app", "out")
        .with_bower("true")
        .build();

    assert_eq!(cfg.commands.bower, "true");
    assert_eq!(cfg.commands.babel, "npx babel app/js --out-dir out/js");
    assert_eq!(cfg.js_glob(), "app/js/**/*.js");
}
