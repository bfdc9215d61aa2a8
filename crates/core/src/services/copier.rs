use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{PackcoreError, Result};
use crate::layout::StagingLayout;

/// How a file is placed inside the staging directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMode {
    /// Into the staging root by base name (binary, core).
    Shallow,
    /// Under its own absolute directory path, re-rooted at staging (libraries).
    Deep,
}

/// Copy every file into staging; the first failure aborts.
///
/// Returns the destination paths in input order.
pub fn copy_files(files: &[PathBuf], layout: &StagingLayout, mode: CopyMode) -> Result<Vec<PathBuf>> {
    files.iter().map(|file| copy_into_staging(file, layout, mode)).collect()
}

pub fn copy_into_staging(source: &Path, layout: &StagingLayout, mode: CopyMode) -> Result<PathBuf> {
    let destination = match mode {
        CopyMode::Shallow => layout.shallow_path(source),
        CopyMode::Deep => layout.deep_path(source),
    };
    if mode == CopyMode::Deep {
        log::debug!("Deep copying '{}' to '{}'", source.display(), destination.display());
    } else {
        log::debug!("Copying {} to {}", source.display(), destination.display());
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| PackcoreError::io("Failed creating directory", parent, e))?;
    }
    fs::copy(source, &destination)
        .map_err(|e| PackcoreError::io("Failed copying file", source, e))?;
    Ok(destination)
}
