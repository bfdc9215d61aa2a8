//! Error taxonomy for the collection pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Unified result type across the core crate.
pub type Result<T> = std::result::Result<T, PackcoreError>;

/// Every way a collection run can abort.
///
/// Platform snapshot failures are logged and never surface here.
#[derive(Debug, Error)]
pub enum PackcoreError {
    /// Bad or missing input: no core, not a core, binary not found.
    #[error("{0}")]
    Configuration(String),

    /// Neither a debugger nor a dependency lister could be found.
    #[error("Could not find {wanted}. Cannot collect artifacts")]
    ToolUnavailable { wanted: String },

    /// A required external tool could not be run to completion.
    #[error("Failed executing {command}: {reason}")]
    Tool { command: String, reason: String },

    /// Libraries referenced by the binary or core are not on this host.
    #[error("Unable to find libraries:\n{}\nPlease check environment or run with '--ignore-missing' flag", format_list(.missing))]
    MissingLibraries { missing: Vec<String> },

    /// The resolver ran but its result cannot be used.
    #[error("Library resolution failed: {0}")]
    Resolution(String),

    #[error("{context} '{}': {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The staged bundle is missing artifacts; every missing item is listed.
    #[error("Bundle verification failed:\n{}", format_list(.missing))]
    Integrity { missing: Vec<String> },

    #[error("Failed creating archive {}: {reason}", .archive.display())]
    Archive { archive: PathBuf, reason: String },

    /// The operator declined to continue at a confirmation prompt.
    #[error("Canceling packcore due to user request")]
    Cancelled,
}

impl PackcoreError {
    /// Wrap an I/O error with the operation and path it concerns.
    pub fn io(context: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { context, path: path.into(), source }
    }
}

fn format_list(items: &[String]) -> String {
    items.iter().map(|item| format!("    {item}")).collect::<Vec<_>>().join("\n")
}
