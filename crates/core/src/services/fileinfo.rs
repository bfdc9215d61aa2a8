//! Core file identification through the `file` tool.
//!
//! `file` prints something like:
//!
//! ```text
//! core.1234: ELF 64-bit LSB core file, x86-64, version 1 (SYSV), SVR4-style,
//! from 'postgres: gpadmin template1 [local] con8 cmd1 idle', real uid: 500,
//! execfn: '/usr/local/gpdb/bin/postgres', platform: 'x86_64'
//! ```
//!
//! From that we confirm the input is a core and work out which binary dumped it.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{PackcoreError, Result};
use crate::tools::exec::run_tool_checked;
use crate::tools::lookup_executable;

const CORE_MARKER: &str = "LSB core file";

/// Run `file` on `path` and return its trimmed description.
pub fn identify(file_tool: &Path, path: &Path, timeout: Duration) -> Result<String> {
    let output = run_tool_checked(file_tool, [path.as_os_str()], timeout)?;
    let description = output.stdout_lossy().trim_matches(|c| c == '\n' || c == ' ').to_string();
    log::debug!("'file' command returned: {description}");
    Ok(description)
}

pub fn is_core(description: &str) -> bool {
    description.contains(CORE_MARKER)
}

/// Command name recorded in the `from '...'` field, e.g. `postgres`.
///
/// Only the first word is kept and a trailing `:` (postgres process titles) is
/// dropped.
pub fn binary_name_from_description(description: &str) -> Option<String> {
    let start = match description.find("from '") {
        Some(idx) => idx + "from '".len(),
        None => description.find('\'')? + 1,
    };
    let rest = &description[start..];
    let end = rest.find('\'')?;
    let command = rest[..end].split(' ').next().unwrap_or("").trim_matches(|c| c == '\n' || c == ' ');
    let command = command.strip_suffix(':').unwrap_or(command);
    if command.is_empty() {
        None
    } else {
        Some(command.to_string())
    }
}

/// Absolute executable path from newer `file` output (`execfn: '/path'`).
pub fn execfn_from_description(description: &str) -> Option<PathBuf> {
    let start = description.find("execfn: '")? + "execfn: '".len();
    let rest = &description[start..];
    let end = rest.find('\'')?;
    let path = PathBuf::from(&rest[..end]);
    path.is_absolute().then_some(path)
}

/// Work out the absolute path of the binary that produced the core.
///
/// An explicit binary wins; otherwise `execfn` is used when it exists on this
/// host, then the `from` command name is looked up on `search_path`.
pub fn resolve_binary(
    explicit: Option<&str>,
    description: &str,
    search_path: &OsStr,
) -> Result<PathBuf> {
    let found = match explicit {
        Some(name) => lookup_executable(name, search_path).ok_or_else(|| {
            PackcoreError::Configuration(format!(
                "Unable to find binary specified on command line: {name}"
            ))
        })?,
        None => match execfn_from_description(description).filter(|p| p.is_file()) {
            Some(path) => path,
            None => {
                let name = binary_name_from_description(description).ok_or_else(|| {
                    PackcoreError::Configuration(
                        "Unable to parse binary name from core file description; pass --binary"
                            .to_string(),
                    )
                })?;
                log::debug!("Parsing binary name from file output: {name}");
                lookup_executable(&name, search_path).ok_or_else(|| {
                    PackcoreError::Configuration(format!(
                        "Unable to find binary name {name}; pass --binary"
                    ))
                })?
            }
        },
    };

    let absolute = found
        .canonicalize()
        .map_err(|e| PackcoreError::io("Could not determine absolute path for", &found, e))?;
    log::debug!("binary full path {}", absolute.display());
    Ok(absolute)
}
