use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use packcore_core::config::load_config_or_default;
use packcore_core::tools::ToolCapabilities;

#[derive(Debug, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub configured: String,
    pub path: Option<PathBuf>,
    pub required: bool,
}

#[derive(Debug, Serialize)]
pub struct ToolsReport {
    pub tools: Vec<ToolInfo>,
    /// `gdb`, `ldd`, or `None` when neither resolver is usable.
    pub strategy: Option<String>,
}

/// Build the capability report for the effective configuration.
pub fn tools_report(config_path: Option<&Path>) -> Result<ToolsReport> {
    let config = load_config_or_default(config_path)?;
    let caps = ToolCapabilities::detect(&config.tools);
    let tools = &config.tools;

    let entry = |name: &str, configured: &str, path: &Option<PathBuf>, required: bool| ToolInfo {
        name: name.to_string(),
        configured: configured.to_string(),
        path: path.clone(),
        required,
    };
    let entries = vec![
        entry("gdb", &tools.gdb, &caps.debugger, false),
        entry("ldd", &tools.ldd, &caps.dependency_lister, false),
        entry("file", &tools.file, &caps.file_identifier, true),
        entry("tar", &tools.tar, &caps.archiver, true),
        entry("lsb_release", &tools.lsb_release, &caps.lsb_release, false),
        entry("uname", &tools.uname, &caps.uname, false),
    ];
    let strategy = caps.strategy(true).ok().map(|s| s.as_str().to_string());
    Ok(ToolsReport { tools: entries, strategy })
}

/// List the external tools packcore depends on.
pub fn tools_command(config_path: Option<&Path>, json: bool) -> Result<()> {
    let report = tools_report(config_path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Tools:");
    for tool in &report.tools {
        let location = match &tool.path {
            Some(path) => path.display().to_string(),
            None if tool.required => "(missing, required)".to_string(),
            None => "(missing)".to_string(),
        };
        println!("- {}: {}", tool.name, location);
    }
    match &report.strategy {
        Some(strategy) => println!("Library resolution: {strategy}"),
        None => println!("Library resolution: unavailable (need gdb or ldd)"),
    }

    Ok(())
}
