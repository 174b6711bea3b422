use nix::sys::signal::Signal;
use std::io;
use std::path::PathBuf;

/// Errors that abort a gauntlet run
#[derive(Debug, thiserror::Error)]
pub enum GauntletError {
    #[error("Required tool '{program}' was not found on PATH")]
    ToolMissing { program: String },

    #[error("Failed to spawn step '{step}': {source}")]
    Spawn {
        step: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to wait for step '{step}': {source}")]
    Wait {
        step: String,
        #[source]
        source: io::Error,
    },

    #[error("Step '{step}' failed with exit code {code}")]
    StepFailed { step: String, code: i32 },

    #[error("Interrupted by {signal}")]
    Interrupted { signal: Signal },

    #[error("Failed to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("Invalid examples pattern '{pattern}': {message}")]
    Discovery { pattern: String, message: String },
}

impl GauntletError {
    /// Process exit code to report for this error
    ///
    /// A failed step propagates the child's own code and an interrupted run
    /// reports `128 + signal`. Everything else is an internal failure of the
    /// runner and exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            GauntletError::StepFailed { code, .. } if *code != 0 => *code,
            GauntletError::Interrupted { signal } => 128 + *signal as i32,
            _ => 1,
        }
    }
}

/// Result type alias for gauntlet operations
pub type Result<T> = std::result::Result<T, GauntletError>;
