//! Runner facade over a single persistent engine instance.

use crate::bridge;
use crate::cache::{CacheStats, CachedSchemaState, SchemaCache};
use crate::cleanup::{reset_instance, CleanupReport};
use crate::config::RunnerConfig;
use crate::error::{ErrorLogEntry, Result, RunnerError};
use crate::gateway::{Gateway, InvocationResult};
use chrono::{DateTime, Utc};
use flatrun_engine::{Engine, EngineFactory};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunnerId(Uuid);

impl RunnerId {
    /// Create a new random runner ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RunnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Drives `flatc` on one engine instance, reusing mounted schemas between
/// calls.
///
/// Every operation takes `&mut self`: the engine is not reentrant, so calls
/// on one runner are serialized. Use separate runners (or a
/// [`StreamingTransformer`](crate::StreamingTransformer)) for parallelism.
///
/// Failed operations are also appended to an error log that is never
/// cleared; see [`Runner::errors`].
pub struct Runner<E: Engine> {
    id: RunnerId,
    pub(crate) engine: E,
    pub(crate) config: RunnerConfig,
    pub(crate) cache: SchemaCache,
    pub(crate) gateway: Gateway,
    errors: Vec<ErrorLogEntry>,
    created_at: DateTime<Utc>,
}

impl<E: Engine> Runner<E> {
    /// Instantiate a fresh engine from `factory` and wrap it with the
    /// default configuration.
    pub async fn init<F>(factory: &F) -> Result<Self>
    where
        F: EngineFactory<Engine = E> + ?Sized,
    {
        Self::init_with_config(factory, RunnerConfig::default()).await
    }

    /// Instantiate a fresh engine from `factory` with a custom configuration.
    pub async fn init_with_config<F>(factory: &F, config: RunnerConfig) -> Result<Self>
    where
        F: EngineFactory<Engine = E> + ?Sized,
    {
        config.validate()?;
        let start = std::time::Instant::now();
        let engine = factory.instantiate().await?;
        let runner = Self::from_parts(engine, config);
        tracing::debug!(
            runner_id = %runner.id,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Engine instantiated"
        );
        Ok(runner)
    }

    /// Wrap an existing engine with the default configuration.
    pub fn new(engine: E) -> Self {
        Self::from_parts(engine, RunnerConfig::default())
    }

    /// Wrap an existing engine with a custom configuration.
    pub fn with_config(engine: E, config: RunnerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(engine, config))
    }

    /// Config must already be validated.
    pub(crate) fn from_parts(engine: E, config: RunnerConfig) -> Self {
        let id = RunnerId::new();
        tracing::info!(
            runner_id = %id,
            binary_extension = %config.binary_extension,
            "Runner created"
        );
        Self {
            id,
            engine,
            config,
            cache: SchemaCache::new(),
            gateway: Gateway::new(),
            errors: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Get the runner ID.
    pub fn id(&self) -> RunnerId {
        self.id
    }

    /// Get the creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get the configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// The underlying engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Schema cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// The currently cached schema, if any.
    pub fn cached_schema(&self) -> Option<&CachedSchemaState> {
        self.cache.state()
    }

    /// Run `flatc` with a raw argument vector.
    ///
    /// A non-zero exit code is not an error here; check
    /// [`InvocationResult::success`].
    pub fn run_command<S: AsRef<str>>(&mut self, args: &[S]) -> Result<InvocationResult> {
        let args: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();
        let result = self
            .gateway
            .invoke(&mut self.engine, &args)
            .map_err(RunnerError::from);
        self.record("run_command", result)
    }

    /// Write a file into the engine's filesystem, creating parent
    /// directories.
    ///
    /// Overwriting a file of the cached schema drops the cache, so the next
    /// encode or decode remounts it.
    pub fn mount_file(&mut self, path: &str, data: impl AsRef<[u8]>) -> Result<()> {
        self.cache.invalidate_overlapping([path]);
        let result = bridge::mount(self.engine.fs_mut(), path, data.as_ref()).map_err(RunnerError::from);
        self.record("mount_file", result)
    }

    /// Write several files in order; later entries win on duplicate paths.
    pub fn mount_files<'a, I>(&mut self, files: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a [u8])>,
    {
        let files: Vec<_> = files.into_iter().collect();
        self.cache
            .invalidate_overlapping(files.iter().map(|(path, _)| *path));
        let result = bridge::mount_many(self.engine.fs_mut(), files).map_err(RunnerError::from);
        self.record("mount_files", result)
    }

    /// Every regular file under `root`, depth-first.
    pub fn list_files(&mut self, root: &str) -> Result<Vec<String>> {
        let result = bridge::list_all(self.engine.fs(), root).map_err(RunnerError::from);
        self.record("list_files", result)
    }

    /// `flatc --help` output.
    pub fn help(&mut self) -> Result<String> {
        Ok(self.run_command(&["--help"])?.stdout)
    }

    /// `flatc --version` output.
    pub fn version(&mut self) -> Result<String> {
        Ok(self.run_command(&["--version"])?.stdout)
    }

    /// Every failure recorded so far, oldest first.
    pub fn errors(&self) -> &[ErrorLogEntry] {
        &self.errors
    }

    /// Reset the engine's filesystem and release the instance.
    pub fn destroy(mut self) -> CleanupReport {
        self.teardown()
    }

    pub(crate) fn teardown(&mut self) -> CleanupReport {
        let start = std::time::Instant::now();
        tracing::info!(runner_id = %self.id, "Destroying runner");

        let report = reset_instance(self.engine.fs_mut());
        report.log("destroy");

        tracing::info!(
            runner_id = %self.id,
            errors_logged = self.errors.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Runner destroyed"
        );
        report
    }

    /// Append a failed result to the error log and pass it through.
    pub(crate) fn record<T>(&mut self, operation: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            tracing::warn!(runner_id = %self.id, operation, error = %e, "Operation failed");
            self.errors.push(ErrorLogEntry::new(operation, e));
        }
        result
    }
}

/// Map a non-zero invocation to a diagnostic error.
pub(crate) fn invocation_error(args: Vec<String>, result: InvocationResult) -> RunnerError {
    RunnerError::EngineInvocation {
        exit_code: result.exit_code,
        args,
        stdout: result.stdout,
        stderr: result.stderr,
    }
}
