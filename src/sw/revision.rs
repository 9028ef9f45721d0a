// src/sw/revision.rs

use std::path::Path;

use anyhow::{Context, Result};

use crate::fs::FileSystem;

/// Content revision of a precached file: the blake3 digest of its bytes, hex
/// encoded. Any byte change yields a new revision and a cache refresh.
pub fn content_revision(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let bytes = fs
        .read(path)
        .with_context(|| format!("computing revision of {}", path.display()))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
