//! Error types for flatrun-core.

use chrono::{DateTime, Utc};
use flatrun_engine::{EngineError, FsError};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for flatrun-core operations.
pub type Result<T> = std::result::Result<T, RunnerError>;

fn or_empty(text: &str) -> &str {
    if text.trim().is_empty() {
        "(empty)"
    } else {
        text.trim()
    }
}

/// Errors that can occur while driving the compiler.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The compiler exited with a non-zero code.
    #[error(
        "flatc failed with exit code {exit_code}\nArguments: {}\n--- stdout ---\n{}\n--- stderr ---\n{}",
        .args.join(" "),
        or_empty(.stdout),
        or_empty(.stderr)
    )]
    EngineInvocation {
        /// Exit code reported by the engine
        exit_code: i32,
        /// Full argument vector
        args: Vec<String>,
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
    },

    /// The compiler exited with 0 but the expected artifact is absent.
    #[error(
        "flatc succeeded but no {expected} output was found.\nExpected output in directory: {directory}\nFiles present: {}\nArguments: {}\n--- stdout ---\n{}\n--- stderr ---\n{}",
        .present.join(", "),
        .args.join(" "),
        or_empty(.stdout),
        or_empty(.stderr)
    )]
    MissingOutput {
        /// Expected artifact (extension or path)
        expected: String,
        /// Directory that was searched
        directory: String,
        /// Entries found in the directory
        present: Vec<String>,
        /// Full argument vector
        args: Vec<String>,
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
    },

    /// The engine failed internally; the instance should be considered lost.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Mounting or harvesting files failed
    #[error("filesystem error: {0}")]
    Fs(#[from] FsError),

    /// Code generation failed; carries the compiler's stderr verbatim.
    #[error("{0}")]
    CodeGeneration(String),

    /// Schema input violates its invariants
    #[error("invalid schema input: {0}")]
    InvalidSchema(String),

    /// Call-specific input is unusable
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl RunnerError {
    /// True for failures raised by the engine itself rather than by the tool.
    pub fn is_engine_fault(&self) -> bool {
        matches!(self, Self::Engine(_))
    }
}

/// A failed operation recorded in a runner's error log.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorLogEntry {
    /// When the failure was recorded.
    pub timestamp: DateTime<Utc>,
    /// Public operation that failed (`encode`, `decode`, ...).
    pub operation: String,
    /// Top-level error message.
    pub message: String,
    /// Messages of the error's source chain, outermost first.
    pub trace: Vec<String>,
}

impl ErrorLogEntry {
    pub(crate) fn new(operation: &str, error: &(dyn std::error::Error + 'static)) -> Self {
        let mut trace = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            trace.push(cause.to_string());
            source = cause.source();
        }

        Self {
            timestamp: Utc::now(),
            operation: operation.to_string(),
            message: error.to_string(),
            trace,
        }
    }
}
