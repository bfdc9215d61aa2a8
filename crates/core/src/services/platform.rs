//! Best-effort capture of OS identification into the bundle.
//!
//! Nothing here can fail the run: every problem is logged and skipped.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::config::PlatformConfig;
use crate::layout::{StagingLayout, LSB_RELEASE_FILE, UNAME_FILE};
use crate::services::copier::{copy_into_staging, CopyMode};
use crate::tools::exec::run_tool_checked;
use crate::tools::ToolCapabilities;

/// What the snapshot managed to collect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformSnapshot {
    pub lsb_release: bool,
    pub release_files: Vec<PathBuf>,
    pub appliance_version: bool,
    pub kernel_release: Option<String>,
}

/// Write distribution, appliance and kernel identification into staging.
pub fn snapshot_platform(
    layout: &StagingLayout,
    platform: &PlatformConfig,
    capabilities: &ToolCapabilities,
    timeout: Duration,
) -> PlatformSnapshot {
    let mut snapshot = PlatformSnapshot::default();

    match &capabilities.lsb_release {
        Some(lsb_release) => {
            snapshot.lsb_release = capture_to_file(
                lsb_release,
                &["-a"],
                &layout.staging_dir.join(LSB_RELEASE_FILE),
                timeout,
            )
            .is_some();
        }
        None => {
            for release in release_files(&platform.release_dir, &platform.release_suffix) {
                match copy_into_staging(&release, layout, CopyMode::Deep) {
                    Ok(_) => snapshot.release_files.push(release),
                    Err(e) => log::warn!("Failed copying release file: {e}"),
                }
            }
        }
    }

    if platform.appliance_version_file.is_file() {
        match copy_into_staging(&platform.appliance_version_file, layout, CopyMode::Shallow) {
            Ok(_) => snapshot.appliance_version = true,
            Err(e) => log::warn!("Failed copying appliance version: {e}"),
        }
    }

    match &capabilities.uname {
        Some(uname) => {
            snapshot.kernel_release =
                capture_to_file(uname, &["-r"], &layout.staging_dir.join(UNAME_FILE), timeout)
                    .map(|out| out.trim().to_string());
        }
        None => log::info!("uname not found; skipping kernel release"),
    }

    snapshot
}

/// Files in `dir` whose names end with `suffix` (the `/etc/*release` glob).
pub fn release_files(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::info!("Could not list {}: {e}", dir.display());
            return Vec::new();
        }
    };
    let mut found: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(suffix))
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    found.sort();
    found
}

fn capture_to_file(
    tool: &Path,
    args: &[&str],
    destination: &Path,
    timeout: Duration,
) -> Option<String> {
    let output = match run_tool_checked(tool, args, timeout) {
        Ok(output) => output,
        Err(e) => {
            log::info!("{e}");
            return None;
        }
    };
    let text = output.stdout_lossy();
    if let Err(e) = fs::write(destination, &output.stdout) {
        log::info!("Could not create file '{}': {e}", destination.display());
        return None;
    }
    Some(text)
}
