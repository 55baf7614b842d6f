//! Runner configuration types.

use crate::error::RunnerError;
use serde::{Deserialize, Serialize};

/// Configuration shared by [`Runner`](crate::Runner) and
/// [`StreamingTransformer`](crate::StreamingTransformer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Extension of binary artifacts, without the dot (default: `mon`).
    ///
    /// Must match the schema's `file_extension` declaration; `flatc` falls
    /// back to `bin` when the schema declares none.
    pub binary_extension: String,
    /// Extension of text documents, without the dot (default: `json`).
    pub text_extension: String,
    /// Directory under which transient inputs and outputs are created
    /// (default: `/`).
    pub transient_root: String,
    /// Directory under which default code-generation outputs are created
    /// (default: `/out`).
    pub codegen_root: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            binary_extension: "mon".to_string(),
            text_extension: "json".to_string(),
            transient_root: "/".to_string(),
            codegen_root: "/out".to_string(),
        }
    }
}

impl RunnerConfig {
    /// Create a new config builder.
    pub fn builder() -> RunnerConfigBuilder {
        RunnerConfigBuilder::default()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), RunnerError> {
        for (name, ext) in [
            ("binary_extension", &self.binary_extension),
            ("text_extension", &self.text_extension),
        ] {
            if ext.is_empty() || ext.contains('.') || ext.contains('/') {
                return Err(RunnerError::Config(format!(
                    "{name} must be a bare extension, got {ext:?}"
                )));
            }
        }
        if self.binary_extension == self.text_extension {
            return Err(RunnerError::Config(
                "binary_extension and text_extension must differ".into(),
            ));
        }
        for (name, root) in [
            ("transient_root", &self.transient_root),
            ("codegen_root", &self.codegen_root),
        ] {
            if flatrun_engine::fs::components(root).is_err() {
                return Err(RunnerError::Config(format!(
                    "{name} must be an absolute path, got {root:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Builder for RunnerConfig.
#[derive(Debug, Default)]
pub struct RunnerConfigBuilder {
    config: RunnerConfig,
}

impl RunnerConfigBuilder {
    /// Set the binary artifact extension.
    pub fn binary_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.binary_extension = ext.into();
        self
    }

    /// Set the text document extension.
    pub fn text_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.text_extension = ext.into();
        self
    }

    /// Set the transient root directory.
    pub fn transient_root(mut self, path: impl Into<String>) -> Self {
        self.config.transient_root = path.into();
        self
    }

    /// Set the code-generation root directory.
    pub fn codegen_root(mut self, path: impl Into<String>) -> Self {
        self.config.codegen_root = path.into();
        self
    }

    /// Build the configuration, validating all fields.
    pub fn build(self) -> Result<RunnerConfig, RunnerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
