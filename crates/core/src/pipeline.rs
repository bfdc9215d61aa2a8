//! End-to-end collection of one core file.
//!
//! ```text
//! Start -> DirectoryPrepared -> Resolved -> PlatformSnapshotted -> ArtifactsCopied
//!       -> ScriptGenerated -> Verified -> Archived -> CleanedUp
//! ```
//!
//! Any failure after `DirectoryPrepared` removes the staging directory (unless
//! the operator asked to keep it) before the error is returned.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::PackcoreConfig;
use crate::errors::{PackcoreError, Result};
use crate::layout::{base_name, StagingLayout};
use crate::prompt::Confirm;
use crate::services::archive::{cleanup_staging, create_archive};
use crate::services::copier::{copy_files, copy_into_staging, CopyMode};
use crate::services::fileinfo::{identify, is_core, resolve_binary};
use crate::services::integrity::verify_bundle;
use crate::services::manifest::BundleManifest;
use crate::services::platform::snapshot_platform;
use crate::services::resolver::{resolve_libraries, LibraryResolution};
use crate::services::script::generate_launcher;
use crate::tools::{ResolveStrategy, ToolCapabilities};

/// Progress of a run; the last state reached is kept for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Start,
    DirectoryPrepared,
    Resolved,
    PlatformSnapshotted,
    ArtifactsCopied,
    ScriptGenerated,
    Verified,
    Archived,
    CleanedUp,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Start => "start",
            RunState::DirectoryPrepared => "directory-prepared",
            RunState::Resolved => "resolved",
            RunState::PlatformSnapshotted => "platform-snapshotted",
            RunState::ArtifactsCopied => "artifacts-copied",
            RunState::ScriptGenerated => "script-generated",
            RunState::Verified => "verified",
            RunState::Archived => "archived",
            RunState::CleanedUp => "cleaned-up",
        };
        f.write_str(name)
    }
}

/// Operator inputs for one collection.
#[derive(Debug, Clone)]
pub struct CollectRequest {
    /// Core file as given; made absolute before use.
    pub core: PathBuf,
    /// Explicit binary; auto-detected from the core when `None`.
    pub binary: Option<String>,
    /// Where staging and archive are created.
    pub output_dir: PathBuf,
    pub keep_staging: bool,
    pub tolerate_missing: bool,
}

/// Summary of a successful collection.
#[derive(Debug, Clone, Serialize)]
pub struct CollectReport {
    pub archive: PathBuf,
    pub staging_dir: PathBuf,
    pub kept_staging: bool,
    pub core: PathBuf,
    pub binary: PathBuf,
    pub strategy: ResolveStrategy,
    pub libraries: Vec<PathBuf>,
    pub missing_libraries: Vec<String>,
    pub final_state: RunState,
}

#[derive(Debug, Clone)]
pub enum CollectOutcome {
    Archived(CollectReport),
    /// A staging directory already existed and the operator kept it.
    Declined { staging_dir: PathBuf },
}

/// Warn about a missing installation root and ask whether to go on.
pub fn preflight(config: &PackcoreConfig, prompt: &mut dyn Confirm) -> Result<()> {
    let problem = match env::var_os(&config.install_root_var) {
        None => Some(format!("${} is not set", config.install_root_var)),
        Some(value) if value.is_empty() => Some(format!("${} is empty", config.install_root_var)),
        Some(value) if !Path::new(&value).is_dir() => Some(format!(
            "${} points to '{}', which is not a directory",
            config.install_root_var,
            value.to_string_lossy()
        )),
        Some(_) => None,
    };

    if let Some(problem) = problem {
        log::warn!(
            "Detected problem with ${} environmental variable\n{problem}",
            config.install_root_var
        );
        if !prompt.confirm("Continue executing packcore?", true) {
            return Err(PackcoreError::Cancelled);
        }
    }
    Ok(())
}

/// Runs the collection state machine for one core file.
pub struct Collector<'a> {
    config: &'a PackcoreConfig,
    capabilities: ToolCapabilities,
    prompt: &'a mut dyn Confirm,
    state: RunState,
}

impl<'a> Collector<'a> {
    pub fn new(
        config: &'a PackcoreConfig,
        capabilities: ToolCapabilities,
        prompt: &'a mut dyn Confirm,
    ) -> Self {
        Self { config, capabilities, prompt, state: RunState::Start }
    }

    /// Last state reached by the most recent run.
    pub fn state(&self) -> RunState {
        self.state
    }

    fn advance(&mut self, next: RunState) {
        log::debug!("packcore state {} -> {}", self.state, next);
        self.state = next;
    }

    pub fn collect(&mut self, request: &CollectRequest) -> Result<CollectOutcome> {
        self.state = RunState::Start;

        let core = absolute_core(&request.core)?;
        log::debug!("coreFile full path: {}", core.display());

        let timeout = self.config.tool_timeout();
        let file_tool = self.capabilities.require_file_identifier()?.to_path_buf();
        let description = identify(&file_tool, &core, timeout)?;
        if !is_core(&description) {
            return Err(PackcoreError::Configuration(format!(
                "File '{}' does not appear to be a core",
                core.display()
            )));
        }
        log::debug!("Confirmed {} looks like a core file", core.display());

        let search_path = env::var_os("PATH").unwrap_or_default();
        let binary = resolve_binary(request.binary.as_deref(), &description, &search_path)?;

        // Fail on missing tools before touching the filesystem.
        self.capabilities.strategy(true)?;
        self.capabilities.require_archiver()?;

        let layout = StagingLayout::new(&request.output_dir, &core);
        if !self.prepare_directory(&layout)? {
            return Ok(CollectOutcome::Declined { staging_dir: layout.staging_dir });
        }
        self.advance(RunState::DirectoryPrepared);

        let result = self.run_stages(&layout, &core, &binary, request.tolerate_missing);
        cleanup_staging(&layout, request.keep_staging);

        match result {
            Ok((resolution, archive)) => {
                self.advance(RunState::CleanedUp);
                log::info!("Packcore generated:\n\t{}", archive.display());
                Ok(CollectOutcome::Archived(CollectReport {
                    archive,
                    staging_dir: layout.staging_dir,
                    kept_staging: request.keep_staging,
                    core,
                    binary,
                    strategy: resolution.strategy,
                    libraries: resolution.libraries,
                    missing_libraries: resolution.missing,
                    final_state: self.state,
                }))
            }
            Err(e) => {
                log::error!("packcore failed after reaching state {}", self.state);
                Err(e)
            }
        }
    }

    /// Create a fresh staging directory; `Ok(false)` when the operator refuses
    /// to delete an existing one.
    fn prepare_directory(&mut self, layout: &StagingLayout) -> Result<bool> {
        log::info!("Creating temp directory {}", layout.staging_dir.display());
        if layout.staging_dir.exists() {
            let question = format!(
                "Temp directory '{}' already exists... Delete it?",
                layout.staging_dir.display()
            );
            if !self.prompt.confirm(&question, false) {
                log::info!("Leaving {} untouched", layout.staging_dir.display());
                return Ok(false);
            }
            fs::remove_dir_all(&layout.staging_dir).map_err(|e| {
                PackcoreError::io("Not able to remove directory", &layout.staging_dir, e)
            })?;
        }
        fs::create_dir(&layout.staging_dir).map_err(|e| {
            PackcoreError::io("Not able to create directory", &layout.staging_dir, e)
        })?;
        Ok(true)
    }

    fn run_stages(
        &mut self,
        layout: &StagingLayout,
        core: &Path,
        binary: &Path,
        tolerate_missing: bool,
    ) -> Result<(LibraryResolution, PathBuf)> {
        let config = self.config;
        let timeout = config.tool_timeout();

        let resolution =
            resolve_libraries(config, &self.capabilities, binary, Some(core), tolerate_missing)?;
        let diagnostic_path = match resolution.strategy {
            ResolveStrategy::CoreAssisted => layout.gdb_output_path(),
            ResolveStrategy::Static => layout.ldd_output_path(),
        };
        log::info!("Writing {} output", resolution.strategy.as_str());
        fs::write(&diagnostic_path, &resolution.diagnostic)
            .map_err(|e| PackcoreError::io("Failed to write file", &diagnostic_path, e))?;
        self.advance(RunState::Resolved);

        log::info!("Writing platform info");
        let platform =
            snapshot_platform(layout, &config.platform, &self.capabilities, timeout);
        self.advance(RunState::PlatformSnapshotted);

        log::info!("Copying libraries");
        copy_files(&resolution.libraries, layout, CopyMode::Deep)?;
        log::info!("Copying core {}", core.display());
        copy_into_staging(core, layout, CopyMode::Shallow)?;
        log::info!("Copying binary {}", binary.display());
        copy_into_staging(binary, layout, CopyMode::Shallow)?;
        self.advance(RunState::ArtifactsCopied);

        log::info!("Generating gdb script");
        generate_launcher(
            layout,
            &config.launcher_debugger,
            &config.debugger_env_clear,
            &base_name(binary),
            &base_name(core),
        )?;
        BundleManifest::build(
            core,
            binary,
            resolution.strategy,
            &resolution.libraries,
            &resolution.missing,
            platform.kernel_release,
        )?
        .write(layout)?;
        self.advance(RunState::ScriptGenerated);

        log::info!("Checking collected files");
        verify_bundle(layout, Some(core), binary, &resolution.libraries)?;
        self.advance(RunState::Verified);

        let tar = self.capabilities.require_archiver()?.to_path_buf();
        let archive = create_archive(&tar, layout, timeout)?;
        self.advance(RunState::Archived);

        Ok((resolution, archive))
    }
}

fn absolute_core(core: &Path) -> Result<PathBuf> {
    if core.as_os_str().is_empty() {
        return Err(PackcoreError::Configuration("No core file specified".to_string()));
    }
    if !core.exists() {
        return Err(PackcoreError::Configuration(format!(
            "Corefile '{}' does not exist",
            core.display()
        )));
    }
    core.canonicalize()
        .map_err(|e| PackcoreError::io("Could not determine absolute path for", core, e))
}
