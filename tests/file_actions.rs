use std::fs;
use std::path::Path;

use taskgraph::config::ConfigFile;
use taskgraph::exec::{clean_dir, copy_matching_files};
use taskgraph::fs::mock::MockFileSystem;
use taskgraph::fs::{FileSystem, RealFileSystem};
use taskgraph::watch::PathFilter;
use tempfile::TempDir;

fn source_filter(cfg: &ConfigFile) -> PathFilter {
    PathFilter::new(&cfg.src_file_globs(), &cfg.src_file_excludes()).unwrap()
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn copies_everything_but_scripts_on_disk() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "src/index.html", "<html></html>");
    write(root, "src/manifest.json", "{}");
    write(root, "src/css/reader.css", "body {}");
    write(root, "src/img/icons/icon.png", "png");
    write(root, "src/js/app.js", "let x;");
    write(root, "src/js/lib/epub.js", "let y;");
    write(root, "README.md", "# reader");
    write(root, "src/CNAME", "reader.example.org");

    let cfg = ConfigFile::default();
    let copied =
        copy_matching_files(&RealFileSystem, root, "src", "dev", &source_filter(&cfg)).unwrap();

    assert_eq!(copied, 4);
    assert_eq!(
        fs::read_to_string(root.join("dev/index.html")).unwrap(),
        "<html></html>"
    );
    assert!(root.join("dev/manifest.json").is_file());
    assert!(root.join("dev/css/reader.css").is_file());
    assert!(root.join("dev/img/icons/icon.png").is_file());
    assert!(!root.join("dev/js").exists());
    assert!(!root.join("dev/README.md").exists());
    assert!(!root.join("dev/CNAME").exists());
}

#[test]
fn clean_removes_output_and_tolerates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "dev/js/app.js", "compiled");
    write(root, "dev/index.html", "<html></html>");

    let dev = root.join("dev");
    assert!(clean_dir(&RealFileSystem, &dev).unwrap());
    assert!(!dev.exists());

    assert!(!clean_dir(&RealFileSystem, &dev).unwrap());
}

#[test]
fn copy_against_in_memory_tree() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/src/index.html", "<html></html>");
    fs.add_file("/proj/src/css/reader.css", "body {}");
    fs.add_file("/proj/src/js/app.js", "let x;");

    let cfg = ConfigFile::default();
    let copied =
        copy_matching_files(&fs, Path::new("/proj"), "src", "dev", &source_filter(&cfg)).unwrap();

    assert_eq!(copied, 2);
    assert_eq!(
        fs.file_contents("/proj/dev/css/reader.css").unwrap(),
        b"body {}".to_vec()
    );
    assert!(fs.file_contents("/proj/dev/js/app.js").is_none());
}

#[test]
fn clean_in_memory_leaves_sources_alone() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/src/index.html", "<html></html>");
    fs.add_file("/proj/dev/index.html", "<html></html>");

    assert!(clean_dir(&fs, Path::new("/proj/dev")).unwrap());
    assert!(!fs.exists(Path::new("/proj/dev/index.html")));
    assert!(fs.exists(Path::new("/proj/src/index.html")));
}
