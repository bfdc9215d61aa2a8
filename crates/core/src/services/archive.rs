use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{PackcoreError, Result};
use crate::layout::StagingLayout;
use crate::tools::exec::run_tool;

/// Compress the staging directory into `packcore-<core>.tar.gz`.
///
/// The archive stores paths relative to the output directory, so it unpacks
/// into a single `packcore-<core>/` directory.
pub fn create_archive(tar: &Path, layout: &StagingLayout, timeout: Duration) -> Result<PathBuf> {
    let archive = layout.archive_path.clone();
    let args = [
        OsStr::new("czf"),
        archive.as_os_str(),
        OsStr::new("-C"),
        layout.output_dir.as_os_str(),
        OsStr::new(&layout.bundle_name),
    ];
    log::info!("Creating tar bundle {}", archive.display());

    let archive_err = |reason: String| PackcoreError::Archive { archive: archive.clone(), reason };
    let output = run_tool(tar, args, timeout).map_err(|e| archive_err(e.to_string()))?;
    if !output.status.success() {
        return Err(archive_err(format!(
            "tar exited with {}: {}",
            output.status,
            output.stderr_lossy()
        )));
    }
    if !archive.is_file() {
        return Err(archive_err("tar reported success but no archive was written".to_string()));
    }
    Ok(archive)
}

/// Remove the staging directory unless the operator asked to keep it.
///
/// Removal is best-effort; a failure is logged, never returned.
pub fn cleanup_staging(layout: &StagingLayout, keep: bool) {
    if keep {
        log::info!("Keeping temp directory {}", layout.staging_dir.display());
        return;
    }
    if !layout.staging_dir.exists() {
        return;
    }
    log::debug!("Removing temp directory {}", layout.staging_dir.display());
    if let Err(e) = fs::remove_dir_all(&layout.staging_dir) {
        log::warn!("Failed removing temp directory {}: {e}", layout.staging_dir.display());
    }
}
