use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolError>;

/// Failures while preparing or running a bundled tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The resolved executable does not exist or is not a regular file.
    #[error("{} was not found", .path.display())]
    NotFound { path: PathBuf },

    /// The OS refused to start the process.
    #[error("Unable to start process {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unknown tool: {0}. Supported: adb, fastboot")]
    UnknownTool(String),
}
