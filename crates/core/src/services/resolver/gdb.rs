use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use super::{LibraryResolution, LibraryResolver, ParsedLibraries, ResolveRequest};
use crate::config::PackcoreConfig;
use crate::env_guard::{EnvChange, ScopedEnv};
use crate::errors::{PackcoreError, Result};
use crate::tools::exec::run_tool_checked;
use crate::tools::ResolveStrategy;

// `info sharedlibrary` rows: From, To, Syms Read, Shared Object Library.
static SHARED_LIBRARY_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-f]+.*\s(/.*)$").expect("valid gdb row regex"));

/// Reads the shared library map out of a core image with `gdb --batch`.
pub struct GdbResolver {
    env_changes: Vec<EnvChange>,
}

impl GdbResolver {
    pub fn new(env_changes: Vec<EnvChange>) -> Self {
        Self { env_changes }
    }

    /// Clear the configured variables and prefix `PATH` while gdb runs.
    pub fn from_config(config: &PackcoreConfig) -> Self {
        let mut changes: Vec<EnvChange> =
            config.debugger_env_clear.iter().cloned().map(EnvChange::Unset).collect();
        if !config.debugger_path_prefix.is_empty() {
            changes.push(EnvChange::Prepend {
                name: "PATH".to_string(),
                prefix: config.debugger_path_prefix.clone(),
            });
        }
        Self::new(changes)
    }
}

impl LibraryResolver for GdbResolver {
    fn resolve(&self, request: &ResolveRequest<'_>) -> Result<LibraryResolution> {
        let core = request.core.ok_or_else(|| {
            PackcoreError::Resolution("gdb resolution needs a core file".to_string())
        })?;
        log::info!(
            "Running gdb on core {} with {}",
            core.display(),
            request.binary.display()
        );

        let output = {
            let _env = ScopedEnv::acquire(&self.env_changes);
            run_tool_checked(
                request.tool,
                [
                    OsStr::new("--batch"),
                    OsStr::new("--ex"),
                    OsStr::new("info sharedlibrary"),
                    request.binary.as_os_str(),
                    core.as_os_str(),
                ],
                request.timeout,
            )?
        };

        let text = output.stdout_lossy();
        log::debug!("gdb_output\n{text}");
        log::info!("Verifying gdb output");
        let parsed = parse_gdb_output(&text, |path| path.exists());

        Ok(LibraryResolution {
            strategy: self.strategy(),
            libraries: parsed.libraries,
            missing: parsed.missing,
            diagnostic: output.stdout,
        })
    }

    fn strategy(&self) -> ResolveStrategy {
        ResolveStrategy::CoreAssisted
    }
}

/// Parse `info sharedlibrary` output; `exists` classifies each path.
pub fn parse_gdb_output(output: &str, exists: impl Fn(&Path) -> bool) -> ParsedLibraries {
    let mut parsed = ParsedLibraries::default();
    for line in output.lines() {
        let Some(captures) = SHARED_LIBRARY_ROW.captures(line.trim_end()) else {
            continue;
        };
        let path = PathBuf::from(captures[1].trim());
        log::debug!("Library Location parsed: '{}'", path.display());
        if exists(&path) {
            parsed.libraries.push(path);
        } else {
            parsed.missing.push(path.display().to_string());
        }
    }
    parsed
}
