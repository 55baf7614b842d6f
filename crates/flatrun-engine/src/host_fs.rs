//! Virtual filesystem backed by a host directory.
//!
//! Every virtual path is resolved below a fixed root directory; nothing
//! outside the root is reachable.

use crate::error::{FsError, FsResult};
use crate::fs::{components, Metadata, VirtualFs};
use std::fs;
use std::path::{Path, PathBuf};

/// A [`VirtualFs`] rooted at a host directory.
#[derive(Debug, Clone)]
pub struct HostDirFs {
    root: PathBuf,
}

impl HostDirFs {
    /// Create a filesystem rooted at `root`. The directory must exist.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The host directory backing `/`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a virtual path to its host path.
    pub fn host_path(&self, path: &str) -> FsResult<PathBuf> {
        let mut host = self.root.clone();
        for part in components(path)? {
            host.push(part);
        }
        Ok(host)
    }
}

impl VirtualFs for HostDirFs {
    fn mkdir(&mut self, path: &str) -> FsResult<()> {
        let host = self.host_path(path)?;
        fs::create_dir(&host).map_err(|e| FsError::from_io(path, e))
    }

    fn write_file(&mut self, path: &str, data: &[u8]) -> FsResult<()> {
        let host = self.host_path(path)?;
        if host.is_dir() {
            return Err(FsError::IsADirectory(path.to_string()));
        }
        fs::write(&host, data).map_err(|e| FsError::from_io(path, e))
    }

    fn read_file(&self, path: &str) -> FsResult<Vec<u8>> {
        let host = self.host_path(path)?;
        if host.is_dir() {
            return Err(FsError::IsADirectory(path.to_string()));
        }
        fs::read(&host).map_err(|e| FsError::from_io(path, e))
    }

    fn read_dir(&self, path: &str) -> FsResult<Vec<String>> {
        let host = self.host_path(path)?;
        let entries = fs::read_dir(&host).map_err(|e| FsError::from_io(path, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FsError::from_io(path, e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        // Sort by name for consistent output
        names.sort();
        Ok(names)
    }

    fn stat(&self, path: &str) -> FsResult<Metadata> {
        let host = self.host_path(path)?;
        let metadata = fs::metadata(&host).map_err(|e| FsError::from_io(path, e))?;
        Ok(Metadata {
            is_dir: metadata.is_dir(),
            len: if metadata.is_file() { metadata.len() } else { 0 },
        })
    }

    fn unlink(&mut self, path: &str) -> FsResult<()> {
        let host = self.host_path(path)?;
        if host.is_dir() {
            return Err(FsError::IsADirectory(path.to_string()));
        }
        fs::remove_file(&host).map_err(|e| FsError::from_io(path, e))
    }

    fn rmdir(&mut self, path: &str) -> FsResult<()> {
        let host = self.host_path(path)?;
        if host == self.root {
            return Err(FsError::InvalidPath(path.to_string()));
        }
        if !self.stat(path)?.is_dir {
            return Err(FsError::NotADirectory(path.to_string()));
        }
        if !self.read_dir(path)?.is_empty() {
            return Err(FsError::NotEmpty(path.to_string()));
        }
        fs::remove_dir(&host).map_err(|e| FsError::from_io(path, e))
    }

    fn clear_root(&mut self) -> FsResult<()> {
        let entries = fs::read_dir(&self.root).map_err(|e| FsError::from_io("/", e))?;
        for entry in entries {
            let entry = entry.map_err(|e| FsError::from_io("/", e))?;
            let host = entry.path();
            let result = if host.is_dir() {
                fs::remove_dir_all(&host)
            } else {
                fs::remove_file(&host)
            };
            result.map_err(|e| {
                FsError::from_io(&format!("/{}", entry.file_name().to_string_lossy()), e)
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_path_stays_under_root() {
        let fs = HostDirFs::new("/tmp/flatrun-root");
        assert_eq!(
            fs.host_path("/schema/a.fbs").unwrap(),
            PathBuf::from("/tmp/flatrun-root/schema/a.fbs")
        );
        assert_eq!(fs.host_path("/").unwrap(), PathBuf::from("/tmp/flatrun-root"));
        assert!(fs.host_path("/../etc/passwd").is_err());
        assert!(fs.host_path("relative").is_err());
    }

    #[test]
    fn test_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut fs = HostDirFs::new(dir.path());

        fs.mkdir("/schema").unwrap();
        fs.write_file("/schema/a.fbs", b"table A {}").unwrap();
        fs.write_file("/b.json", b"{}").unwrap();

        assert_eq!(fs.read_file("/schema/a.fbs").unwrap(), b"table A {}");
        assert_eq!(fs.read_dir("/").unwrap(), vec!["b.json", "schema"]);
        assert!(fs.stat("/schema").unwrap().is_dir);
        assert!(fs.mkdir("/schema").unwrap_err().is_already_exists());
    }

    #[test]
    fn test_rmdir_non_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut fs = HostDirFs::new(dir.path());

        fs.mkdir("/out").unwrap();
        fs.write_file("/out/a.mon", b"x").unwrap();
        assert!(matches!(fs.rmdir("/out"), Err(FsError::NotEmpty(_))));

        fs.unlink("/out/a.mon").unwrap();
        fs.rmdir("/out").unwrap();
        assert!(!fs.exists("/out"));
    }

    #[test]
    fn test_clear_root_keeps_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut fs = HostDirFs::new(dir.path());

        fs.mkdir("/a").unwrap();
        fs.write_file("/a/b", b"x").unwrap();
        fs.write_file("/c", b"y").unwrap();

        fs.clear_root().unwrap();
        assert!(fs.read_dir("/").unwrap().is_empty());
        assert!(dir.path().exists());
    }
}
