//! Virtual filesystem contract and POSIX path helpers.

use crate::error::{FsError, FsResult};

/// Metadata returned by [`VirtualFs::stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    /// True if the path is a directory.
    pub is_dir: bool,
    /// File size in bytes (0 for directories).
    pub len: u64,
}

impl Metadata {
    /// True if the path is a regular file.
    pub fn is_file(&self) -> bool {
        !self.is_dir
    }
}

/// A sandboxed, POSIX-like filesystem the engine reads and writes through.
///
/// Paths are absolute, `/`-separated and case-sensitive. Implementations
/// return directory listings in a deterministic order and never include
/// `.` or `..`.
pub trait VirtualFs: Send {
    /// Create a single directory. Fails with [`FsError::AlreadyExists`] if
    /// the path exists and [`FsError::NotFound`] if the parent is missing.
    fn mkdir(&mut self, path: &str) -> FsResult<()>;

    /// Create or overwrite a file. The parent directory must exist.
    fn write_file(&mut self, path: &str, data: &[u8]) -> FsResult<()>;

    /// Read a file's bytes.
    fn read_file(&self, path: &str) -> FsResult<Vec<u8>>;

    /// List the names in a directory.
    fn read_dir(&self, path: &str) -> FsResult<Vec<String>>;

    /// Stat a path.
    fn stat(&self, path: &str) -> FsResult<Metadata>;

    /// Remove a file.
    fn unlink(&mut self, path: &str) -> FsResult<()>;

    /// Remove an empty directory.
    fn rmdir(&mut self, path: &str) -> FsResult<()>;

    /// Detach a mounted filesystem from `path`.
    fn unmount(&mut self, path: &str) -> FsResult<()> {
        Err(FsError::NotMounted(path.to_string()))
    }

    /// Drop every open stream handle held by the filesystem.
    fn close_streams(&mut self) {}

    /// Remove everything below `/`.
    fn clear_root(&mut self) -> FsResult<()>;

    /// Read a file and decode it as UTF-8.
    fn read_to_string(&self, path: &str) -> FsResult<String> {
        let bytes = self.read_file(path)?;
        String::from_utf8(bytes).map_err(|_| FsError::InvalidUtf8(path.to_string()))
    }

    /// True if `path` exists.
    fn exists(&self, path: &str) -> bool {
        self.stat(path).is_ok()
    }
}

/// Split an absolute path into its components.
///
/// Empty components (`//`, trailing `/`) are ignored; `.` and `..` are
/// rejected. The root yields an empty list.
pub fn components(path: &str) -> FsResult<Vec<&str>> {
    if !path.starts_with('/') {
        return Err(FsError::InvalidPath(path.to_string()));
    }
    let mut parts = Vec::new();
    for part in path.split('/').filter(|p| !p.is_empty()) {
        if part == "." || part == ".." {
            return Err(FsError::InvalidPath(path.to_string()));
        }
        parts.push(part);
    }
    Ok(parts)
}

/// Parent directory of a path; top-level entries map to `/`.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) if idx > 0 => &path[..idx],
        _ => "/",
    }
}

/// Final component of a path.
pub fn file_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Join a directory and an entry name without doubling the root slash.
pub fn join(dir: &str, name: &str) -> String {
    if dir == "/" {
        format!("/{name}")
    } else {
        format!("{}/{name}", dir.trim_end_matches('/'))
    }
}
