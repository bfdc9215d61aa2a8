mod common;

use common::Workspace;
use packcore::commands::tools_report;
use packcore::{canonicalize_or_current, commands::tools_command};
use predicates::prelude::*;

#[test]
fn tools_report_lists_found_and_missing() {
    let ws = Workspace::new();
    let report = tools_report(Some(&ws.config_path)).unwrap();

    let gdb = report.tools.iter().find(|t| t.name == "gdb").unwrap();
    assert!(gdb.path.is_none());
    let ldd = report.tools.iter().find(|t| t.name == "ldd").unwrap();
    assert!(ldd.path.is_some());
    assert_eq!(report.strategy.as_deref(), Some("ldd"));

    tools_command(Some(&ws.config_path), false).unwrap();
    tools_command(Some(&ws.config_path), true).unwrap();
}

#[test]
fn tools_json_from_binary() {
    let ws = Workspace::new();
    let output = ws.packcore().args(["tools", "--json"]).assert().success().get_output().stdout.clone();
    let body: serde_json::Value = serde_json::from_slice(&output).expect("tools json");
    assert_eq!(body["strategy"], "ldd");
    assert_eq!(body["tools"].as_array().unwrap().len(), 6);
}

#[test]
fn tools_text_flags_missing_resolvers() {
    let ws = Workspace::new();
    std::fs::remove_file(ws.root().join("tools/ldd")).unwrap();
    ws.packcore()
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("unavailable (need gdb or ldd)"));
}

#[test]
fn unreadable_config_is_an_error() {
    let ws = Workspace::new();
    std::fs::write(&ws.config_path, "not-json").unwrap();
    let err = tools_report(Some(&ws.config_path)).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse packcore config JSON"));
}

#[test]
fn canonicalize_or_current_joins_missing_paths() {
    let result = canonicalize_or_current("definitely/not/here").unwrap();
    assert!(result.is_absolute());
    assert!(result.ends_with("definitely/not/here"));
}
