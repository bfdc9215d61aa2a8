//! Shared library resolution.
//!
//! Two interchangeable resolvers produce the list of libraries a crashed
//! process needed: [`GdbResolver`] reads the library map out of the core image
//! and [`LddResolver`] asks the dynamic linker about the binary. Which one runs
//! is decided by [`ToolCapabilities::strategy`], not by the caller.

mod gdb;
mod ldd;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::config::PackcoreConfig;
use crate::errors::{PackcoreError, Result};
use crate::tools::{ResolveStrategy, ToolCapabilities};

pub use gdb::{parse_gdb_output, GdbResolver};
pub use ldd::{parse_ldd_output, LddResolver};

/// Libraries parsed out of one tool's output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLibraries {
    /// Absolute paths that exist (or that the tool says it resolved).
    pub libraries: Vec<PathBuf>,
    /// Names or paths of libraries that could not be found.
    pub missing: Vec<String>,
}

/// Outcome of resolving a binary's shared libraries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryResolution {
    pub strategy: ResolveStrategy,
    /// Ordered absolute library paths; duplicates are harmless.
    pub libraries: Vec<PathBuf>,
    pub missing: Vec<String>,
    /// Raw output of the tool, stored in the bundle for later inspection.
    #[serde(skip)]
    pub diagnostic: Vec<u8>,
}

/// Inputs for a single resolver invocation.
#[derive(Debug, Clone)]
pub struct ResolveRequest<'a> {
    pub binary: &'a Path,
    pub core: Option<&'a Path>,
    /// Resolved path of the tool the resolver drives.
    pub tool: &'a Path,
    pub timeout: Duration,
}

/// Implemented by the gdb- and ldd-backed resolvers.
pub trait LibraryResolver {
    fn resolve(&self, request: &ResolveRequest<'_>) -> Result<LibraryResolution>;
    fn strategy(&self) -> ResolveStrategy;
}

/// Resolve the libraries for `binary` (and `core` when given), then apply the
/// missing-library policy.
pub fn resolve_libraries(
    config: &PackcoreConfig,
    capabilities: &ToolCapabilities,
    binary: &Path,
    core: Option<&Path>,
    tolerate_missing: bool,
) -> Result<LibraryResolution> {
    let strategy = capabilities.strategy(core.is_some())?;
    let resolution = match strategy {
        ResolveStrategy::CoreAssisted => {
            let tool = capabilities.debugger.as_deref().ok_or_else(|| {
                PackcoreError::ToolUnavailable { wanted: "gdb".to_string() }
            })?;
            let request = ResolveRequest { binary, core, tool, timeout: config.tool_timeout() };
            GdbResolver::from_config(config).resolve(&request)?
        }
        ResolveStrategy::Static => {
            let tool = capabilities.dependency_lister.as_deref().ok_or_else(|| {
                PackcoreError::ToolUnavailable { wanted: "ldd".to_string() }
            })?;
            let request = ResolveRequest { binary, core, tool, timeout: config.tool_timeout() };
            LddResolver::from_config(config).resolve(&request)?
        }
    };
    apply_missing_policy(resolution, tolerate_missing)
}

/// Fail on missing libraries unless the operator asked to tolerate them.
pub fn apply_missing_policy(
    resolution: LibraryResolution,
    tolerate_missing: bool,
) -> Result<LibraryResolution> {
    if resolution.missing.is_empty() {
        return Ok(resolution);
    }
    if !tolerate_missing {
        return Err(PackcoreError::MissingLibraries { missing: resolution.missing });
    }
    for lib in &resolution.missing {
        log::warn!("Unable to find library {lib}; continuing without it");
    }
    Ok(resolution)
}
