//! Isolated streaming transformer.
//!
//! Every call instantiates a brand-new engine, runs one encode or decode
//! against it and tears it down again. Nothing survives between calls, so
//! the transformer can run indefinitely without engine memory growing, at
//! the price of one engine startup per call.
//!
//! ```text
//!  transform_*() ──▶ factory.instantiate() ──▶ InstanceScope ──▶ Runner::encode/decode
//!                                                   │
//!                                   Drop (success, error, cancel)
//!                                                   ▼
//!                                     reset_instance() + release
//! ```

use crate::config::RunnerConfig;
use crate::error::Result;
use crate::options::{BinaryInput, DecodeOptions, DecodedOutput, OutputEncoding};
use crate::runner::Runner;
use crate::schema::SchemaInput;
use flatrun_engine::fs::join;
use flatrun_engine::{Engine, EngineFactory};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Engine instance counters for a transformer.
#[derive(Debug, Default)]
pub struct TransformerStats {
    /// Engines instantiated.
    pub created: AtomicU64,
    /// Engines torn down and released.
    pub released: AtomicU64,
}

impl TransformerStats {
    /// Get the number of engines created.
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    /// Get the number of engines released.
    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }

    /// Engines currently alive.
    pub fn live(&self) -> u64 {
        self.created().saturating_sub(self.released())
    }
}

/// Owns one per-call engine and releases it when dropped.
///
/// The engine itself is dropped right after the reset, together with the
/// scope.
struct InstanceScope<E: Engine> {
    runner: Runner<E>,
    stats: Arc<TransformerStats>,
}

impl<E: Engine> Drop for InstanceScope<E> {
    fn drop(&mut self) {
        let report = self.runner.teardown();
        self.stats.released.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            runner_id = %self.runner.id(),
            clean = report.is_clean(),
            "Transformer instance released"
        );
    }
}

/// Encode/decode against a fixed schema with a fresh engine per call.
///
/// The schema is fixed at construction. Calls share no mutable state
/// beyond the counters, so one transformer can serve many concurrent
/// callers.
pub struct StreamingTransformer<F: EngineFactory> {
    schema: Arc<SchemaInput>,
    factory: F,
    config: RunnerConfig,
    stats: Arc<TransformerStats>,
}

impl<F: EngineFactory> StreamingTransformer<F> {
    /// Create a transformer with the default configuration.
    pub fn new(schema: SchemaInput, factory: F) -> Self {
        Self {
            schema: Arc::new(schema),
            factory,
            config: RunnerConfig::default(),
            stats: Arc::new(TransformerStats::default()),
        }
    }

    /// Create a transformer with a custom configuration.
    pub fn with_config(schema: SchemaInput, factory: F, config: RunnerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(schema, factory)
        })
    }

    /// The fixed schema.
    pub fn schema(&self) -> &SchemaInput {
        &self.schema
    }

    /// Instance counters.
    pub fn stats(&self) -> &TransformerStats {
        &self.stats
    }

    /// The engine factory.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Encode a JSON document on a fresh engine.
    pub async fn transform_json_to_binary(&self, document: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        let mut scope = self.acquire().await?;
        scope.runner.encode(&self.schema, document)
    }

    /// Decode a binary buffer on a fresh engine, returning the JSON bytes.
    pub async fn transform_binary_to_json(&self, buffer: impl AsRef<[u8]>) -> Result<DecodedOutput> {
        let options = DecodeOptions {
            encoding: OutputEncoding::Bytes,
            ..Default::default()
        };
        self.transform_binary_to_json_with(buffer, &options).await
    }

    /// Decode a binary buffer on a fresh engine with explicit options.
    pub async fn transform_binary_to_json_with(
        &self,
        buffer: impl AsRef<[u8]>,
        options: &DecodeOptions,
    ) -> Result<DecodedOutput> {
        let path = join(
            &self.config.transient_root,
            &format!("input.{}", self.config.binary_extension),
        );
        let input = BinaryInput {
            path: &path,
            data: buffer.as_ref(),
        };

        let mut scope = self.acquire().await?;
        scope.runner.decode(&self.schema, &input, options)
    }

    async fn acquire(&self) -> Result<InstanceScope<F::Engine>> {
        let start = std::time::Instant::now();
        let engine = self.factory.instantiate().await?;
        self.stats.created.fetch_add(1, Ordering::Relaxed);

        let runner = Runner::from_parts(engine, self.config.clone());
        tracing::debug!(
            runner_id = %runner.id(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            live = self.stats.live(),
            "Transformer instance acquired"
        );

        Ok(InstanceScope {
            runner,
            stats: Arc::clone(&self.stats),
        })
    }
}
