//! Configuration for the subprocess engine.
//!
//! Configuration is loaded from environment variables with sensible defaults.

use crate::error::EngineError;
use std::path::PathBuf;

/// Default cap on captured output per channel (1 MB).
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Configuration for [`ProcessEngine`](crate::ProcessEngine) instances.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to (or name of) the `flatc` binary.
    pub flatc_path: PathBuf,
    /// Host directory under which each instance gets its own root.
    pub scratch_root: PathBuf,
    /// Maximum bytes kept per output channel (default: 1 MB).
    pub max_output_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            flatc_path: PathBuf::from("flatc"),
            scratch_root: std::env::temp_dir().join("flatrun"),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

impl EngineConfig {
    /// Create a new config builder.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `FLATRUN_FLATC` | `flatc` (resolved via `PATH`) |
    /// | `FLATRUN_SCRATCH` | `$TMPDIR/flatrun` |
    /// | `FLATRUN_MAX_OUTPUT` | `1048576` |
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            flatc_path: std::env::var("FLATRUN_FLATC")
                .map(PathBuf::from)
                .unwrap_or(default.flatc_path),
            scratch_root: std::env::var("FLATRUN_SCRATCH")
                .map(PathBuf::from)
                .unwrap_or(default.scratch_root),
            max_output_bytes: std::env::var("FLATRUN_MAX_OUTPUT")
                .ok()
                .and_then(|v| parse_or_warn("FLATRUN_MAX_OUTPUT", &v))
                .unwrap_or(default.max_output_bytes),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.flatc_path.as_os_str().is_empty() {
            return Err(EngineError::Config("flatc_path is required".into()));
        }
        if self.scratch_root.as_os_str().is_empty() {
            return Err(EngineError::Config("scratch_root is required".into()));
        }
        if self.max_output_bytes == 0 {
            return Err(EngineError::Config("max_output_bytes must be > 0".into()));
        }
        Ok(())
    }

    /// Warn about an explicit `flatc` path that does not exist.
    ///
    /// Bare names are resolved through `PATH` at spawn time and are not
    /// checked.
    pub fn validate_warn(&self) {
        if self.flatc_path.components().count() > 1 && !self.flatc_path.exists() {
            tracing::warn!("flatc not found: {:?}", self.flatc_path);
        }
    }
}

/// Builder for EngineConfig.
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Set the `flatc` binary path.
    pub fn flatc(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.flatc_path = path.into();
        self
    }

    /// Set the host scratch directory.
    pub fn scratch_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.scratch_root = path.into();
        self
    }

    /// Set the per-channel output cap.
    pub fn max_output_bytes(mut self, bytes: usize) -> Self {
        self.config.max_output_bytes = bytes;
        self
    }

    /// Build the configuration, validating all fields.
    pub fn build(self) -> Result<EngineConfig, EngineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Parse an environment value, logging and ignoring it if malformed.
fn parse_or_warn<T: std::str::FromStr>(name: &str, value: &str) -> Option<T> {
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}: {:?}", name, value);
            None
        }
    }
}
