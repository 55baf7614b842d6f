//! # flatrun-engine
//!
//! Engine capability layer for flatrun.
//! Defines the contract the orchestration layer drives (an argv-style
//! `flatc` entry point plus a POSIX-like virtual filesystem) and ships the
//! embeddings that satisfy it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use flatrun_engine::{CapturedOutput, Engine, EngineConfig, ProcessEngine};
//!
//! # async fn example() -> flatrun_engine::Result<()> {
//! let config = EngineConfig::from_env();
//! let mut engine = ProcessEngine::create(config).await?;
//!
//! // Files are addressed by virtual absolute paths
//! engine.fs_mut().write_file("/monster.fbs", b"table Monster {} root_type Monster;")?;
//!
//! let mut output = CapturedOutput::default();
//! engine.call_main(&["--version".to_string()], &mut output)?;
//! println!("{}", output.stdout);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Engine contract**: `Engine`, `EngineFactory` and `OutputSink`
//! - **Filesystems**: in-memory `MemFs` and host-directory `HostDirFs`
//! - **Subprocess engine**: `ProcessEngine` runs a native `flatc` per call
//!   inside a per-instance scratch directory

mod config;
mod engine;
mod error;
pub mod fs;
mod host_fs;
mod mem_fs;
mod process;

pub use config::{EngineConfig, EngineConfigBuilder, DEFAULT_MAX_OUTPUT_BYTES};
pub use engine::{CapturedOutput, Engine, EngineFactory, OutputSink};
pub use error::{EngineError, FsError, FsResult, Result};
pub use fs::{Metadata, VirtualFs};
pub use host_fs::HostDirFs;
pub use mem_fs::MemFs;
pub use process::{ProcessEngine, ProcessEngineFactory};
