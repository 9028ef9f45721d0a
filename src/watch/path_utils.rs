// src/watch/path_utils.rs

//! Path helpers shared by the watcher, the file actions and the
//! service-worker generator.

use std::path::{Path, PathBuf};

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (e.g. symlinked temp directories on macOS), we
///   canonicalize both paths and try again.
///
/// Returns `None` if the path cannot be related to `root`, or if it *is*
/// `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return non_empty(rel);
    }

    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return non_empty(rel);
        }
    }

    None
}

fn non_empty(rel: &Path) -> Option<String> {
    let s = rel.to_string_lossy().replace('\\', "/");
    if s.is_empty() { None } else { Some(s) }
}

/// Literal directory prefix of a glob: every leading component without glob
/// metacharacters, excluding the last one.
///
/// `"dev/**/*.html"` → `"dev"`, `"src/*.*"` → `"src"`, `"bower.json"` → `""`.
pub fn glob_base(pattern: &str) -> PathBuf {
    let components: Vec<&str> = pattern.split('/').collect();
    let mut base = PathBuf::new();
    for (idx, component) in components.iter().enumerate() {
        let is_last = idx + 1 == components.len();
        if is_last || component.contains(['*', '?', '[', '{']) {
            break;
        }
        base.push(component);
    }
    base
}
