use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that may point at a JSON config file.
pub const CONFIG_ENV: &str = "PACKCORE_CONFIG";

/// Names or paths of the external tools the pipeline shells out to.
///
/// A value containing `/` is used as-is; anything else is searched on `PATH`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub gdb: String,
    pub ldd: String,
    pub file: String,
    pub tar: String,
    pub lsb_release: String,
    pub uname: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            gdb: "gdb".to_string(),
            ldd: "ldd".to_string(),
            file: "file".to_string(),
            tar: "tar".to_string(),
            lsb_release: "lsb_release".to_string(),
            uname: "uname".to_string(),
        }
    }
}

/// Where the platform snapshot looks for distribution identification files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Directory scanned for `*<release_suffix>` files when `lsb_release` is absent.
    pub release_dir: PathBuf,
    pub release_suffix: String,
    /// Appliance version file copied when present.
    pub appliance_version_file: PathBuf,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            release_dir: PathBuf::from("/etc"),
            release_suffix: "release".to_string(),
            appliance_version_file: PathBuf::from("/etc/gpdb-appliance-version"),
        }
    }
}

/// Serializable configuration for a collection run.
///
/// Every field has a default, so a config file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackcoreConfig {
    pub tools: ToolPaths,
    /// Debugger invoked by the generated `runGDB.sh`.
    pub launcher_debugger: String,
    /// Upper bound for any single external tool invocation.
    pub tool_timeout_secs: u64,
    /// Installation root checked during preflight.
    pub install_root_var: String,
    /// Variables cleared while gdb inspects the core.
    pub debugger_env_clear: Vec<String>,
    /// Directory prepended to `PATH` while gdb inspects the core.
    pub debugger_path_prefix: String,
    /// Libraries loaded at runtime that `ldd` cannot see; added when present.
    pub shim_libraries: Vec<PathBuf>,
    pub platform: PlatformConfig,
}

impl Default for PackcoreConfig {
    fn default() -> Self {
        Self {
            tools: ToolPaths::default(),
            launcher_debugger: "/usr/bin/gdb".to_string(),
            tool_timeout_secs: 300,
            install_root_var: "GPHOME".to_string(),
            debugger_env_clear: vec![
                "LD_LIBRARY_PATH".to_string(),
                "PYTHONHOME".to_string(),
                "PYTHONPATH".to_string(),
            ],
            debugger_path_prefix: "/usr/bin".to_string(),
            shim_libraries: vec![
                PathBuf::from("/lib64/libgcc_s.so.1"),
                PathBuf::from("/lib64/libnss_files.so.2"),
                PathBuf::from("/lib/libgcc_s.so.1"),
                PathBuf::from("/lib/libnss_files.so.2"),
            ],
            platform: PlatformConfig::default(),
        }
    }
}

impl PackcoreConfig {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}

/// Load a config JSON file from disk.
pub fn load_config(path: &Path) -> Result<PackcoreConfig> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read packcore config at {}", path.display()))?;
    let config: PackcoreConfig =
        serde_json::from_str(&body).context("Failed to parse packcore config JSON")?;
    Ok(config)
}

/// Resolve the effective config: explicit path, then `PACKCORE_CONFIG`, then defaults.
pub fn load_config_or_default(explicit: Option<&Path>) -> Result<PackcoreConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => load_config(Path::new(&path)),
        _ => Ok(PackcoreConfig::default()),
    }
}
