//! Discovery of the external tools the pipeline depends on.
//!
//! Tools are probed once per run and the result is carried around as a typed
//! [`ToolCapabilities`] value.

pub mod exec;

use std::env;
use std::ffi::OsStr;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::ToolPaths;
use crate::errors::{PackcoreError, Result};

pub use exec::{run_tool, ToolOutput};

/// Which library resolution strategy a run will use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveStrategy {
    /// `gdb` reads the shared library map out of the core image.
    CoreAssisted,
    /// `ldd` lists the binary's dynamic dependencies.
    Static,
}

impl ResolveStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolveStrategy::CoreAssisted => "gdb",
            ResolveStrategy::Static => "ldd",
        }
    }
}

/// Resolved locations of every configured tool; `None` means not found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCapabilities {
    pub debugger: Option<PathBuf>,
    pub dependency_lister: Option<PathBuf>,
    pub file_identifier: Option<PathBuf>,
    pub archiver: Option<PathBuf>,
    pub lsb_release: Option<PathBuf>,
    pub uname: Option<PathBuf>,
}

impl ToolCapabilities {
    /// Probe every configured tool against the current `PATH`.
    pub fn detect(tools: &ToolPaths) -> Self {
        let search = env::var_os("PATH").unwrap_or_default();
        Self::detect_in(tools, &search)
    }

    /// Probe every configured tool against an explicit search path.
    pub fn detect_in(tools: &ToolPaths, search_path: &OsStr) -> Self {
        let probe = |name: &str| {
            let found = lookup_executable(name, search_path);
            if found.is_none() {
                log::debug!("Tool '{name}' not found");
            }
            found
        };
        Self {
            debugger: probe(&tools.gdb),
            dependency_lister: probe(&tools.ldd),
            file_identifier: probe(&tools.file),
            archiver: probe(&tools.tar),
            lsb_release: probe(&tools.lsb_release),
            uname: probe(&tools.uname),
        }
    }

    /// Pick the resolution strategy: core-assisted first, static second.
    ///
    /// Core-assisted needs a core image as well as the debugger.
    pub fn strategy(&self, have_core: bool) -> Result<ResolveStrategy> {
        match (&self.debugger, &self.dependency_lister) {
            (Some(_), _) if have_core => Ok(ResolveStrategy::CoreAssisted),
            (_, Some(_)) => Ok(ResolveStrategy::Static),
            _ => Err(PackcoreError::ToolUnavailable { wanted: "gdb or ldd".to_string() }),
        }
    }

    pub fn require_file_identifier(&self) -> Result<&Path> {
        self.file_identifier
            .as_deref()
            .ok_or_else(|| PackcoreError::ToolUnavailable { wanted: "file".to_string() })
    }

    pub fn require_archiver(&self) -> Result<&Path> {
        self.archiver
            .as_deref()
            .ok_or_else(|| PackcoreError::ToolUnavailable { wanted: "tar".to_string() })
    }
}

/// Resolve `name` the way a shell would: paths with `/` are checked directly,
/// bare names are searched on `search_path`.
pub fn lookup_executable(name: &str, search_path: &OsStr) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    if name.contains('/') {
        let candidate = PathBuf::from(name);
        return is_executable(&candidate).then_some(candidate);
    }
    find_in_path(name, search_path)
}

/// Resolve `name` against the current process `PATH`.
pub fn which(name: &str) -> Option<PathBuf> {
    let search = env::var_os("PATH").unwrap_or_default();
    lookup_executable(name, &search)
}

fn find_in_path(executable: &str, search_path: &OsStr) -> Option<PathBuf> {
    env::split_paths(search_path).find_map(|dir| {
        let candidate = dir.join(executable);
        if is_executable(&candidate) {
            Some(candidate)
        } else {
            None
        }
    })
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
