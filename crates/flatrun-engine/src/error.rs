//! Error types for flatrun-engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Result type alias for virtual filesystem operations.
pub type FsResult<T> = std::result::Result<T, FsError>;

/// Errors raised by a [`VirtualFs`](crate::VirtualFs) implementation.
#[derive(Debug, Error)]
pub enum FsError {
    /// Path does not exist
    #[error("no such file or directory: {0}")]
    NotFound(String),

    /// Path already exists
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// A path component is a file where a directory was expected
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// A directory was given where a file was expected
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// Directory still has entries
    #[error("directory not empty: {0}")]
    NotEmpty(String),

    /// Path is not a mount point
    #[error("not a mount point: {0}")]
    NotMounted(String),

    /// Path is not absolute or contains `.`/`..` components
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// File content is not valid UTF-8
    #[error("file is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    /// Host I/O error
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Virtual path that caused the error.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    /// Map a host I/O error onto the virtual path it was raised for.
    pub fn from_io(path: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_string()),
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists(path.to_string()),
            _ => Self::Io {
                path: path.to_string(),
                source: err,
            },
        }
    }

    /// True if the error reports a missing path.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// True if the error reports an existing path.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

/// Errors raised by an engine instance.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The compiler terminated with a plain exit code.
    ///
    /// This is the tool-level "abnormal termination" signal, not a fault.
    #[error("engine exited with code {0}")]
    Exit(i32),

    /// The engine failed internally (abort, signal, missing binary).
    #[error("engine fault: {0}")]
    Fault(String),

    /// Failed to create an engine instance
    #[error("failed to start engine: {0}")]
    Startup(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Virtual filesystem error
    #[error("filesystem error: {0}")]
    Fs(#[from] FsError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_maps_kinds() {
        let err = FsError::from_io(
            "/a",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.is_not_found());

        let err = FsError::from_io(
            "/a",
            std::io::Error::new(std::io::ErrorKind::AlreadyExists, "there"),
        );
        assert!(err.is_already_exists());

        let err = FsError::from_io(
            "/a",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(err, FsError::Io { .. }));
        assert!(err.to_string().contains("/a"));
    }

    #[test]
    fn test_exit_display() {
        assert_eq!(EngineError::Exit(2).to_string(), "engine exited with code 2");
    }
}
