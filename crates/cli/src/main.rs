use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use packcore::commands::{collect_command, tools_command, CollectArgs, CollectStatus};
use packcore::logger_builder;

/// Bundle a core file with everything needed to debug it on another host.
///
/// This CLI is a thin wrapper around `packcore-core` (exposed in code as `packcore_core`).
#[derive(Parser, Debug)]
#[command(
    name = "packcore",
    version,
    about = "Package a core file, its binary and shared libraries for offline debugging",
    long_about = None
)]
struct Cli {
    /// JSON config file. Falls back to $PACKCORE_CONFIG, then built-in defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect a core file into `packcore-<core>.tar.gz`.
    ///
    /// This will:
    /// - Resolve the shared libraries the process had loaded (gdb, else ldd).
    /// - Copy libraries (keeping their paths), the core and the binary.
    /// - Write `runGDB.sh`, platform info and a manifest, then archive it all.
    Collect {
        /// Core file to package.
        #[arg(long)]
        core: String,

        /// Binary that produced the core. Detected from the core when omitted.
        #[arg(long)]
        binary: Option<String>,

        /// Keep the staging directory after archiving.
        #[arg(long, alias = "keep-tmp", default_value_t = false)]
        keep_tmp_dir: bool,

        /// Continue when some shared libraries cannot be found.
        #[arg(long, alias = "ignore-libs", default_value_t = false)]
        ignore_missing: bool,

        /// Answer yes to every prompt.
        #[arg(short, long, default_value_t = false)]
        assume_yes: bool,

        /// Directory receiving the staging directory and archive. Defaults to the current directory.
        #[arg(long, default_value = ".")]
        output_dir: String,

        /// Emit a JSON summary instead of the archive path.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show which external tools were found and the strategy a run would use.
    Tools {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger_builder(cli.verbose).init();

    match cli.command {
        Command::Collect {
            core,
            binary,
            keep_tmp_dir,
            ignore_missing,
            assume_yes,
            output_dir,
            json,
        } => {
            let args = CollectArgs {
                core,
                binary,
                keep_staging: keep_tmp_dir,
                tolerate_missing: ignore_missing,
                assume_yes,
                output_dir,
                json,
            };
            if collect_command(cli.config.as_deref(), &args)? == CollectStatus::Declined {
                log::info!("Existing staging directory kept; nothing collected");
            }
        }
        Command::Tools { json } => tools_command(cli.config.as_deref(), json)?,
    }

    Ok(())
}
