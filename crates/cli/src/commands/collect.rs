use std::io;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use packcore_core::config::load_config_or_default;
use packcore_core::pipeline::{preflight, CollectOutcome, CollectRequest, Collector};
use packcore_core::prompt::{AssumeYes, Confirm, LinePrompt};
use packcore_core::tools::ToolCapabilities;

use crate::canonicalize_or_current;

/// Flags accepted by `packcore collect`.
#[derive(Debug, Clone)]
pub struct CollectArgs {
    pub core: String,
    pub binary: Option<String>,
    pub keep_staging: bool,
    pub tolerate_missing: bool,
    pub assume_yes: bool,
    pub output_dir: String,
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectStatus {
    Archived,
    /// The operator kept an existing staging directory; nothing was collected.
    Declined,
}

/// Run one collection, prompting on stderr unless `assume_yes` is set.
pub fn collect_command(config_path: Option<&Path>, args: &CollectArgs) -> Result<CollectStatus> {
    if args.assume_yes {
        collect_with_prompt(config_path, args, &mut AssumeYes)
    } else {
        let stdin = io::stdin();
        let mut prompt = LinePrompt::new(stdin.lock(), io::stderr());
        collect_with_prompt(config_path, args, &mut prompt)
    }
}

/// Same as [`collect_command`] with an explicit prompt.
pub fn collect_with_prompt(
    config_path: Option<&Path>,
    args: &CollectArgs,
    prompt: &mut dyn Confirm,
) -> Result<CollectStatus> {
    let config = load_config_or_default(config_path)?;
    preflight(&config, prompt)?;

    let output_dir = canonicalize_or_current(&args.output_dir)?;
    if !output_dir.is_dir() {
        return Err(anyhow!("Output directory {} does not exist", output_dir.display()));
    }

    let request = CollectRequest {
        core: args.core.clone().into(),
        binary: args.binary.clone(),
        output_dir,
        keep_staging: args.keep_staging,
        tolerate_missing: args.tolerate_missing,
    };

    let capabilities = ToolCapabilities::detect(&config.tools);
    let mut collector = Collector::new(&config, capabilities, prompt);
    let outcome = collector
        .collect(&request)
        .with_context(|| format!("packcore failed for core {}", args.core))?;

    match outcome {
        CollectOutcome::Archived(report) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.archive.display());
                if report.kept_staging {
                    println!("Staging directory kept at {}", report.staging_dir.display());
                }
                if !report.missing_libraries.is_empty() {
                    println!("Missing libraries (not bundled):");
                    for lib in &report.missing_libraries {
                        println!("  - {lib}");
                    }
                }
            }
            Ok(CollectStatus::Archived)
        }
        CollectOutcome::Declined { staging_dir } => {
            if args.json {
                let body = serde_json::json!({
                    "declined": true,
                    "staging_dir": staging_dir,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            Ok(CollectStatus::Declined)
        }
    }
}
