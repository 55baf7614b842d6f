//! Subprocess embedding: runs a native `flatc` binary against a host-backed
//! virtual filesystem.
//!
//! Each instance owns a fresh directory under the configured scratch root.
//! Absolute virtual paths in argv are rewritten to host paths below that
//! directory before spawning, and host paths in the captured output are
//! rewritten back, so callers only ever see virtual paths.

use crate::config::EngineConfig;
use crate::engine::{Engine, EngineFactory, OutputSink};
use crate::error::{EngineError, Result};
use crate::fs::VirtualFs;
use crate::host_fs::HostDirFs;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Truncate a string to max bytes, preserving UTF-8 boundaries.
fn truncate_output(s: String, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut truncated = s[..end].to_string();
    truncated.push_str("\n... [output truncated]");
    truncated
}

/// A `flatc` subprocess engine with its own scratch directory.
pub struct ProcessEngine {
    id: Uuid,
    fs: HostDirFs,
    config: EngineConfig,
    live: Option<Arc<AtomicUsize>>,
}

impl ProcessEngine {
    /// Create an instance with a fresh, empty root directory.
    pub async fn create(config: EngineConfig) -> Result<Self> {
        Self::create_tracked(config, None).await
    }

    async fn create_tracked(config: EngineConfig, live: Option<Arc<AtomicUsize>>) -> Result<Self> {
        config.validate()?;

        let id = Uuid::new_v4();
        let root = config.scratch_root.join(id.to_string());
        tracing::debug!(engine_id = %id, root = %root.display(), "Creating engine instance");

        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            tracing::error!(engine_id = %id, error = %e, "Failed to create instance directory");
            EngineError::Startup(format!(
                "failed to create instance directory {}: {e}",
                root.display()
            ))
        })?;

        if let Some(live) = &live {
            live.fetch_add(1, Ordering::Relaxed);
        }

        Ok(Self {
            id,
            fs: HostDirFs::new(root),
            config,
            live,
        })
    }

    /// Unique identifier of this instance.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Host directory backing this instance's `/`.
    pub fn root(&self) -> &Path {
        self.fs.root()
    }

    fn host_args(&self, args: &[String]) -> Vec<OsString> {
        args.iter()
            .map(|arg| {
                if arg.starts_with('/') {
                    if let Ok(host) = self.fs.host_path(arg) {
                        return host.into_os_string();
                    }
                }
                OsString::from(arg)
            })
            .collect()
    }

    fn virtualize(&self, line: &str) -> String {
        let root = format!("{}/", self.fs.root().display());
        line.replace(&root, "/")
    }
}

impl Engine for ProcessEngine {
    fn fs(&self) -> &dyn VirtualFs {
        &self.fs
    }

    fn fs_mut(&mut self) -> &mut dyn VirtualFs {
        &mut self.fs
    }

    fn call_main(&mut self, args: &[String], sink: &mut dyn OutputSink) -> Result<()> {
        tracing::debug!(engine_id = %self.id, argc = args.len(), "Spawning flatc");

        let output = Command::new(&self.config.flatc_path)
            .args(self.host_args(args))
            .current_dir(self.fs.root())
            .output()
            .map_err(|e| {
                tracing::warn!(engine_id = %self.id, error = %e, "flatc spawn failed");
                EngineError::Fault(format!(
                    "failed to execute {}: {e}",
                    self.config.flatc_path.display()
                ))
            })?;

        let max = self.config.max_output_bytes;
        let stdout = truncate_output(String::from_utf8_lossy(&output.stdout).into_owned(), max);
        let stderr = truncate_output(String::from_utf8_lossy(&output.stderr).into_owned(), max);
        for line in stdout.lines() {
            sink.print(&self.virtualize(line));
        }
        for line in stderr.lines() {
            sink.print_err(&self.virtualize(line));
        }

        match output.status.code() {
            Some(0) => Ok(()),
            Some(code) => Err(EngineError::Exit(code)),
            None => Err(EngineError::Fault("flatc terminated by signal".into())),
        }
    }
}

impl Drop for ProcessEngine {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(self.fs.root()) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(engine_id = %self.id, error = %e, "Failed to remove instance directory");
            }
        }
        if let Some(live) = &self.live {
            live.fetch_sub(1, Ordering::Relaxed);
        }
        tracing::trace!(engine_id = %self.id, "Engine instance dropped");
    }
}

/// Factory producing [`ProcessEngine`] instances and counting live ones.
#[derive(Debug, Clone)]
pub struct ProcessEngineFactory {
    config: EngineConfig,
    live: Arc<AtomicUsize>,
}

impl ProcessEngineFactory {
    /// Create a factory for the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        config.validate_warn();
        Self {
            config,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the factory configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of instances created by this factory that are still alive.
    pub fn live_instances(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EngineFactory for ProcessEngineFactory {
    type Engine = ProcessEngine;

    async fn instantiate(&self) -> Result<ProcessEngine> {
        ProcessEngine::create_tracked(self.config.clone(), Some(Arc::clone(&self.live))).await
    }
}
