//! Post-copy verification of the staging directory.

use std::path::{Path, PathBuf};

use crate::errors::{PackcoreError, Result};
use crate::layout::{base_name, StagingLayout, GDB_OUTPUT_FILE, LDD_OUTPUT_FILE};

/// Check that staging holds every artifact the run collected.
///
/// Everything missing is gathered into a single [`PackcoreError::Integrity`]
/// so the operator sees the whole picture at once; a missing staging directory
/// is reported on its own since nothing else can be checked.
pub fn verify_bundle(
    layout: &StagingLayout,
    core: Option<&Path>,
    binary: &Path,
    libraries: &[PathBuf],
) -> Result<()> {
    if !layout.staging_dir.is_dir() {
        return Err(PackcoreError::Integrity {
            missing: vec![format!("packcore directory {}", layout.staging_dir.display())],
        });
    }

    let mut missing = Vec::new();

    if let Some(core) = core {
        if !layout.shallow_path(core).exists() {
            missing.push(format!("core file {}", base_name(core)));
        }
    }
    if !layout.shallow_path(binary).exists() {
        missing.push(format!("binary {}", base_name(binary)));
    }
    for lib in libraries {
        if !layout.deep_path(lib).exists() {
            missing.push(format!("library {}", lib.display()));
        }
    }
    if !layout.ldd_output_path().exists() && !layout.gdb_output_path().exists() {
        missing.push(format!("'{GDB_OUTPUT_FILE}' or '{LDD_OUTPUT_FILE}'"));
    }
    if !layout.launcher_path().exists() {
        missing.push(format!("launcher {}", base_name(&layout.launcher_path())));
    }
    if !layout.manifest_path().exists() {
        missing.push(format!("manifest {}", base_name(&layout.manifest_path())));
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PackcoreError::Integrity { missing })
    }
}
