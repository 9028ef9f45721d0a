// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::fs::FileSystem;
use crate::types::TaskName;
use crate::watch::path_utils::{glob_base, relative_str};

/// Compiled include/exclude glob patterns.
///
/// Patterns are relative to the project root and use `/` as separator. A
/// single `*` never crosses a directory boundary; `**` does.
#[derive(Clone)]
pub struct PathFilter {
    include_patterns: Vec<String>,
    include: GlobSet,
    exclude: Option<GlobSet>,
}

impl fmt::Debug for PathFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathFilter")
            .field("include", &self.include_patterns)
            .finish_non_exhaustive()
    }
}

impl PathFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        let include_set = build_globset(include)?;
        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(exclude)?)
        };
        Ok(Self {
            include_patterns: include.to_vec(),
            include: include_set,
            exclude: exclude_set,
        })
    }

    /// Returns true if `rel_path` (relative to the project root, e.g.
    /// `"src/js/app.js"`) is included and not excluded.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }

    /// Directories that contain every possible match, without nesting.
    ///
    /// Walking only these avoids descending into unrelated trees such as
    /// installed dependencies.
    pub fn base_dirs(&self) -> Vec<PathBuf> {
        let mut bases: Vec<PathBuf> = self
            .include_patterns
            .iter()
            .map(|p| glob_base(p))
            .collect();
        bases.sort();
        bases.dedup();

        let mut result: Vec<PathBuf> = Vec::new();
        for base in bases {
            if !result.iter().any(|kept| base.starts_with(kept)) {
                result.push(base);
            }
        }
        result
    }
}

/// A file-path pattern set paired with the tasks to re-run when a matching
/// path is created, modified or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchBinding {
    pub patterns: Vec<String>,
    pub exclude: Vec<String>,
    pub tasks: Vec<TaskName>,
}

impl WatchBinding {
    pub fn new<P, T>(patterns: P, tasks: T) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<TaskName>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            exclude: Vec::new(),
            tasks: tasks.into_iter().map(Into::into).collect(),
        }
    }

    pub fn excluding<P>(mut self, patterns: P) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
    {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }
}

/// A [`WatchBinding`] with its patterns compiled.
#[derive(Debug, Clone)]
pub struct CompiledBinding {
    filter: PathFilter,
    tasks: Vec<TaskName>,
}

impl CompiledBinding {
    pub fn compile(binding: &WatchBinding) -> Result<Self> {
        let filter = PathFilter::new(&binding.patterns, &binding.exclude)
            .with_context(|| format!("compiling watch binding for tasks {:?}", binding.tasks))?;
        Ok(Self {
            filter,
            tasks: binding.tasks.clone(),
        })
    }

    pub fn tasks(&self) -> &[TaskName] {
        &self.tasks
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.filter.matches(rel_path)
    }
}

/// Compile every binding, failing on the first invalid pattern.
pub fn compile_bindings(bindings: &[WatchBinding]) -> Result<Vec<CompiledBinding>> {
    bindings.iter().map(CompiledBinding::compile).collect()
}

/// Task names bound to `rel_path`, in binding order and without duplicates.
pub fn tasks_for_path(bindings: &[CompiledBinding], rel_path: &str) -> Vec<TaskName> {
    let mut tasks: Vec<TaskName> = Vec::new();
    for binding in bindings.iter().filter(|b| b.matches(rel_path)) {
        for task in binding.tasks() {
            if !tasks.contains(task) {
                tasks.push(task.clone());
            }
        }
    }
    tasks
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Collect all files under `root` matched by `filter`, sorted.
///
/// Only the filter's base directories are walked. Returned paths are
/// `root`-joined.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    filter: &PathFilter,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for base in filter.base_dirs() {
        let start = root.join(&base);
        if fs.is_file(&start) {
            if let Some(rel) = relative_str(root, &start) {
                if filter.matches(&rel) {
                    files.push(start);
                }
            }
            continue;
        }
        if !fs.is_dir(&start) {
            continue;
        }

        let mut stack = vec![start];
        while let Some(dir) = stack.pop() {
            for path in fs.list_dir(&dir)? {
                if fs.is_dir(&path) {
                    stack.push(path);
                } else if fs.is_file(&path) {
                    if let Some(rel) = relative_str(root, &path) {
                        if filter.matches(&rel) {
                            files.push(path);
                        }
                    }
                }
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}
