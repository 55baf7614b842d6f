//! Invocation gateway.
//!
//! Runs the engine's `main` with an argument vector and returns the exit
//! code plus both captured streams.

use flatrun_engine::{CapturedOutput, Engine, EngineError};
use serde::Serialize;
use std::time::Instant;

/// Outcome of one `flatc` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationResult {
    /// Process-style exit code (0 on success).
    pub exit_code: i32,
    /// Captured standard output, trimmed.
    pub stdout: String,
    /// Captured standard error, trimmed.
    pub stderr: String,
}

impl InvocationResult {
    /// True if the exit code is 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Owns the output buffers for one engine instance.
#[derive(Debug, Default)]
pub struct Gateway {
    output: CapturedOutput,
}

impl Gateway {
    /// Create a gateway with empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke the engine.
    ///
    /// An [`EngineError::Exit`] becomes the exit code; any other engine
    /// error is returned unchanged.
    pub fn invoke<E: Engine + ?Sized>(
        &mut self,
        engine: &mut E,
        args: &[String],
    ) -> Result<InvocationResult, EngineError> {
        self.output.reset();
        tracing::trace!(args = ?args, "Invoking flatc");
        let start = Instant::now();

        let exit_code = match engine.call_main(args, &mut self.output) {
            Ok(()) => 0,
            Err(EngineError::Exit(code)) => code,
            Err(e) => {
                tracing::debug!(error = %e, "Engine fault during invocation");
                return Err(e);
            }
        };

        let result = InvocationResult {
            exit_code,
            stdout: self.output.stdout.trim().to_string(),
            stderr: self.output.stderr.trim().to_string(),
        };

        tracing::debug!(
            exit_code,
            stdout_len = result.stdout.len(),
            stderr_len = result.stderr.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Invocation completed"
        );

        Ok(result)
    }
}
