use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use crate::errors::{PackcoreError, Result};
use crate::layout::StagingLayout;

/// Body of `runGDB.sh`.
///
/// Run from inside the unpacked bundle, it points gdb's sysroot at the current
/// directory so every absolute library path resolves into the bundle.
pub fn render_launcher(
    debugger: &str,
    env_clear: &[String],
    binary_name: &str,
    core_name: &str,
) -> String {
    let mut script = String::from("#!/bin/bash\n");
    for var in env_clear {
        script.push_str(&format!("unset {var}\n"));
    }
    script.push_str("curDIR=`pwd`\n");
    script.push_str(&format!(
        "{debugger} --eval-command=\"set sysroot $curDIR\" --eval-command=\"core {}\" {}\n",
        escape_double_quoted(core_name),
        single_quote(binary_name)
    ));
    script
}

/// Escape text for use inside a bash double-quoted string.
fn escape_double_quoted(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Quote text as a single bash word.
fn single_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

/// Write the executable launcher into staging.
pub fn generate_launcher(
    layout: &StagingLayout,
    debugger: &str,
    env_clear: &[String],
    binary_name: &str,
    core_name: &str,
) -> Result<PathBuf> {
    let path = layout.launcher_path();
    let body = render_launcher(debugger, env_clear, binary_name, core_name);
    fs::write(&path, body).map_err(|e| PackcoreError::io("Could not create file", &path, e))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .map_err(|e| PackcoreError::io("Could not chmod file", &path, e))?;
    Ok(path)
}
