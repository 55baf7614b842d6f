//! # flatrun-core
//!
//! Orchestration layer for driving the FlatBuffers compiler (`flatc`).
//!
//! This crate turns an opaque engine (anything implementing
//! [`flatrun_engine::Engine`]) into encode, decode and code-generation
//! operations over in-memory schema trees.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    flatrun-core                          │
//! ├──────────────────────────────────────────────────────────┤
//! │                                                          │
//! │  ┌─────────────────┐     ┌──────────────────────────┐   │
//! │  │     Runner      │────▶│  SchemaCache             │   │
//! │  │  - encode()     │     │  (mounted schema state)  │   │
//! │  │  - decode()     │     └──────────────────────────┘   │
//! │  │  - generate()   │                                    │
//! │  └─────────────────┘                                    │
//! │      │         │                                         │
//! │      ▼         ▼                                         │
//! │  ┌────────┐ ┌─────────┐     ┌──────────────────────┐    │
//! │  │ bridge │ │ Gateway │────▶│ Engine::call_main    │    │
//! │  │ mount  │ │ invoke  │     │ (flatrun-engine)     │    │
//! │  │ list   │ └─────────┘     └──────────────────────┘    │
//! │  └────────┘                                              │
//! │                                                          │
//! │  ┌──────────────────────┐                               │
//! │  │ StreamingTransformer │── fresh engine per call ──┐   │
//! │  └──────────────────────┘                           ▼   │
//! │                                       EngineFactory      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use flatrun_core::{Runner, SchemaInput, BinaryInput, DecodeOptions};
//! use flatrun_engine::{EngineConfig, ProcessEngineFactory};
//!
//! # async fn example() -> flatrun_core::Result<()> {
//! let factory = ProcessEngineFactory::new(EngineConfig::from_env());
//! let mut runner = Runner::init(&factory).await?;
//!
//! let schema = SchemaInput::new(
//!     "/schema/monster.fbs",
//!     [(
//!         "/schema/monster.fbs",
//!         "table Monster { name:string; } root_type Monster; file_extension \"mon\";",
//!     )],
//! )?;
//!
//! // JSON -> binary
//! let binary = runner.encode(&schema, r#"{ "name": "Orc" }"#)?;
//!
//! // binary -> JSON
//! let input = BinaryInput { path: "/monster.mon", data: &binary };
//! let json = runner.decode(&schema, &input, &DecodeOptions::default())?;
//! println!("{}", String::from_utf8_lossy(json.as_bytes()));
//!
//! runner.destroy();
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Schema cache**: repeated calls with an identical schema skip remounting
//! - **Best-effort cleanup**: transient files are removed on every path
//! - **Diagnostics**: failures carry the argument vector and both streams,
//!   and are kept in a per-runner error log
//! - **Streaming transforms**: create-use-destroy engines for unbounded
//!   workloads

pub mod args;
pub mod bridge;
mod cache;
pub mod cleanup;
mod codegen;
mod config;
mod decode;
mod encode;
mod error;
mod gateway;
mod options;
mod runner;
mod schema;
mod transformer;

pub use cache::{CacheStats, CachedSchemaState, SchemaCache};
pub use cleanup::{CleanupFailure, CleanupReport};
pub use config::{RunnerConfig, RunnerConfigBuilder};
pub use error::{ErrorLogEntry, Result, RunnerError};
pub use gateway::{Gateway, InvocationResult};
pub use options::{
    BinaryInput, CodegenOptions, DecodeOptions, DecodedOutput, Language, OutputEncoding,
};
pub use runner::{Runner, RunnerId};
pub use schema::{FileContent, SchemaInput};
pub use transformer::{StreamingTransformer, TransformerStats};
