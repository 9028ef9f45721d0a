// src/fs/mod.rs

//! Filesystem access used by the built-in actions.
//!
//! Copying sources, cleaning the output directory and generating the service
//! worker all go through [`FileSystem`] so they can be exercised against the
//! in-memory [`mock::MockFileSystem`].

use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

/// The handful of filesystem operations the actions need.
///
/// Writers create missing parent directories themselves.
pub trait FileSystem: Send + Sync + Debug {
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;

    /// Recursively delete `path`; `Ok(false)` when there was nothing to delete.
    fn remove_dir_all(&self, path: &Path) -> Result<bool>;

    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate children of `dir`, as full paths, in no particular order.
    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>>;
}

/// [`FileSystem`] backed by the real disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display())),
        _ => Ok(()),
    }
}

impl FileSystem for RealFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).with_context(|| format!("reading {}", path.display()))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        ensure_parent(path)?;
        std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        ensure_parent(to)?;
        std::fs::copy(from, to)
            .map(|_| ())
            .with_context(|| format!("copying {} -> {}", from.display(), to.display()))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<bool> {
        match std::fs::remove_dir_all(path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err).with_context(|| format!("removing {}", path.display())),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::read_dir(dir)
            .with_context(|| format!("listing {}", dir.display()))?
            .map(|entry| Ok(entry.with_context(|| format!("listing {}", dir.display()))?.path()))
            .collect::<Result<Vec<_>>>()
    }
}
