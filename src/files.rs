use std::path::{Path, PathBuf};

use log::*;

use crate::error::{Error, Result};

/// Files below `dir` matching `pattern` (e.g. `**/*.json`), sorted by path.
pub fn find(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let dir = glob::Pattern::escape(&dir.to_string_lossy());
    let full = format!("{}/{}", dir.trim_end_matches('/'), pattern);
    let entries = glob::glob(&full).map_err(|e| Error::Malformed(format!("bad file pattern {:?}: {}", full, e)))?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!("skipping unreadable path: {}", e),
        }
    }
    files.sort();
    Ok(files)
}

pub fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}
