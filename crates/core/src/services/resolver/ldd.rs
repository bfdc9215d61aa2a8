use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{LibraryResolution, LibraryResolver, ParsedLibraries, ResolveRequest};
use crate::config::PackcoreConfig;
use crate::errors::Result;
use crate::tools::exec::run_tool_checked;
use crate::tools::ResolveStrategy;

// glibc ldd: `libc.so.6 => /lib64/libc.so.6 (0x00007f...)`, or
// `libfoo.so.1 => not found` when unresolved. Other ldd implementations
// word the failure differently and are not recognized.
static ARROW_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"=> (\S+)(?:\s|$)").expect("valid ldd arrow regex"));

// Program interpreter: `/lib64/ld-linux-x86-64.so.2 (0x00007f...)`.
static INTERPRETER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(/\S+)\s+\(0x[0-9a-f]+\)\s*$").expect("valid ldd interpreter regex")
});

const UNRESOLVED_MARKER: &str = "not";

/// Lists the binary's dynamic dependencies with `ldd`.
pub struct LddResolver {
    shim_libraries: Vec<PathBuf>,
}

impl LddResolver {
    pub fn new(shim_libraries: Vec<PathBuf>) -> Self {
        Self { shim_libraries }
    }

    pub fn from_config(config: &PackcoreConfig) -> Self {
        Self::new(config.shim_libraries.clone())
    }
}

impl LibraryResolver for LddResolver {
    fn resolve(&self, request: &ResolveRequest<'_>) -> Result<LibraryResolution> {
        // Loaded with dlopen at runtime, so ldd never reports them.
        let mut libraries: Vec<PathBuf> =
            self.shim_libraries.iter().filter(|lib| lib.exists()).cloned().collect();

        log::info!("Running ldd on {}", request.binary.display());
        let output = run_tool_checked(request.tool, [request.binary.as_os_str()], request.timeout)?;

        let text = output.stdout_lossy();
        log::debug!("ldd_output\n{text}");
        log::info!("Verifying ldd output");
        let parsed = parse_ldd_output(&text);
        libraries.extend(parsed.libraries);

        Ok(LibraryResolution {
            strategy: self.strategy(),
            libraries,
            missing: parsed.missing,
            diagnostic: output.stdout,
        })
    }

    fn strategy(&self) -> ResolveStrategy {
        ResolveStrategy::Static
    }
}

/// Parse `ldd` output into resolved paths and unresolved library names.
pub fn parse_ldd_output(output: &str) -> ParsedLibraries {
    let mut parsed = ParsedLibraries::default();
    for line in output.lines() {
        if let Some(captures) = ARROW_TARGET.captures(line) {
            let target = &captures[1];
            log::debug!("Library Location parsed: '{target}'");
            if target == UNRESOLVED_MARKER {
                let name = line.split(" =>").next().unwrap_or(line).trim();
                parsed.missing.push(name.to_string());
            } else {
                parsed.libraries.push(PathBuf::from(target));
            }
        } else if let Some(captures) = INTERPRETER.captures(line) {
            parsed.libraries.push(PathBuf::from(&captures[1]));
        }
    }
    parsed
}
