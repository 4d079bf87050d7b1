//! Project root resolution.
//!
//! The root is the nearest directory, starting at the one containing the
//! source file, that holds the project manifest (`package.json` by default).

use std::path::{Path, PathBuf};

use crate::config::RunnerConfig;
use crate::error::{LensError, Result};

/// Make `path` absolute against the process working directory.
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// Find the directory holding `marker`, checking at most `max_hops` directories.
///
/// The walk starts at the directory containing `file_path` and moves to each
/// parent in turn. Only existence checks are performed.
pub fn resolve_root(file_path: &Path, marker: &str, max_hops: usize) -> Result<PathBuf> {
    let file_path = absolutize(file_path);
    let mut dir = file_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| file_path.clone());

    for hop in 0..max_hops {
        if dir.join(marker).exists() {
            tracing::debug!(root = %dir.display(), hop, "resolved project root");
            return Ok(dir);
        }
        if hop + 1 == max_hops || !dir.pop() {
            break;
        }
    }

    Err(LensError::ProjectRootNotFound {
        file: file_path,
        last_tried: dir,
    })
}

/// Resolve the root with the runner configuration's marker and hop cap.
pub fn resolve_project_root(file_path: &Path, runner: &RunnerConfig) -> Result<PathBuf> {
    resolve_root(file_path, &runner.manifest, runner.max_root_hops)
}
