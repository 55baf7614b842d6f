//! Engine capability contract.
//!
//! An engine is an embedded `flatc` plus the virtual filesystem it reads and
//! writes. The orchestration layer only sees this contract: an argv-style
//! entry point, two line-oriented output channels and the filesystem.

use crate::error::Result;
use crate::fs::VirtualFs;
use async_trait::async_trait;

/// Receives the lines an engine prints during a call.
pub trait OutputSink {
    /// Called once per line written to standard output.
    fn print(&mut self, line: &str);

    /// Called once per line written to standard error.
    fn print_err(&mut self, line: &str);
}

/// A single embedded compiler instance.
///
/// Engines are not reentrant: a second `call_main` while one is in flight is
/// undefined, which `&mut self` rules out.
pub trait Engine: Send {
    /// The instance's filesystem.
    fn fs(&self) -> &dyn VirtualFs;

    /// Mutable access to the instance's filesystem.
    fn fs_mut(&mut self) -> &mut dyn VirtualFs;

    /// Run the compiler's `main` with `args`.
    ///
    /// Returns `Ok(())` for exit code 0, [`EngineError::Exit`] for any other
    /// exit code and another [`EngineError`] variant for internal faults.
    ///
    /// [`EngineError`]: crate::EngineError
    /// [`EngineError::Exit`]: crate::EngineError::Exit
    fn call_main(&mut self, args: &[String], sink: &mut dyn OutputSink) -> Result<()>;
}

/// Creates fresh engine instances.
///
/// Instantiation is the only asynchronous step in the engine lifecycle.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    /// The engine type produced by this factory.
    type Engine: Engine + 'static;

    /// Create a brand-new, empty engine instance.
    async fn instantiate(&self) -> Result<Self::Engine>;
}

/// An [`OutputSink`] that collects both channels into strings.
#[derive(Debug, Default, Clone)]
pub struct CapturedOutput {
    /// Accumulated standard output, one `\n` per line.
    pub stdout: String,
    /// Accumulated standard error, one `\n` per line.
    pub stderr: String,
}

impl CapturedOutput {
    /// Discard everything captured so far.
    pub fn reset(&mut self) {
        self.stdout.clear();
        self.stderr.clear();
    }
}

impl OutputSink for CapturedOutput {
    fn print(&mut self, line: &str) {
        self.stdout.push_str(line);
        self.stdout.push('\n');
    }

    fn print_err(&mut self, line: &str) {
        self.stderr.push_str(line);
        self.stderr.push('\n');
    }
}
