//! In-memory virtual filesystem.

use crate::error::{FsError, FsResult};
use crate::fs::{components, Metadata, VirtualFs};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir(BTreeMap<String, Node>),
}

/// A POSIX-like filesystem held entirely in memory.
///
/// Directory entries live in a `BTreeMap`, so listings are sorted and
/// traversal order is stable for a given filesystem state.
#[derive(Debug, Default, Clone)]
pub struct MemFs {
    root: BTreeMap<String, Node>,
}

impl MemFs {
    /// Create an empty filesystem containing only `/`.
    pub fn new() -> Self {
        Self::default()
    }

    fn dir(&self, path: &str, parts: &[&str]) -> FsResult<&BTreeMap<String, Node>> {
        let mut cur = &self.root;
        for part in parts {
            cur = match cur.get(*part) {
                Some(Node::Dir(children)) => children,
                Some(Node::File(_)) => return Err(FsError::NotADirectory(path.to_string())),
                None => return Err(FsError::NotFound(path.to_string())),
            };
        }
        Ok(cur)
    }

    fn dir_mut(&mut self, path: &str, parts: &[&str]) -> FsResult<&mut BTreeMap<String, Node>> {
        let mut cur = &mut self.root;
        for part in parts {
            cur = match cur.get_mut(*part) {
                Some(Node::Dir(children)) => children,
                Some(Node::File(_)) => return Err(FsError::NotADirectory(path.to_string())),
                None => return Err(FsError::NotFound(path.to_string())),
            };
        }
        Ok(cur)
    }

    fn node(&self, path: &str) -> FsResult<Option<&Node>> {
        let parts = components(path)?;
        match parts.split_last() {
            None => Ok(None),
            Some((name, parent)) => self
                .dir(path, parent)?
                .get(*name)
                .map(Some)
                .ok_or_else(|| FsError::NotFound(path.to_string())),
        }
    }
}

impl VirtualFs for MemFs {
    fn mkdir(&mut self, path: &str) -> FsResult<()> {
        let parts = components(path)?;
        let Some((name, parent)) = parts.split_last() else {
            return Err(FsError::AlreadyExists(path.to_string()));
        };
        let dir = self.dir_mut(path, parent)?;
        if dir.contains_key(*name) {
            return Err(FsError::AlreadyExists(path.to_string()));
        }
        dir.insert(name.to_string(), Node::Dir(BTreeMap::new()));
        Ok(())
    }

    fn write_file(&mut self, path: &str, data: &[u8]) -> FsResult<()> {
        let parts = components(path)?;
        let Some((name, parent)) = parts.split_last() else {
            return Err(FsError::IsADirectory(path.to_string()));
        };
        let dir = self.dir_mut(path, parent)?;
        if let Some(Node::Dir(_)) = dir.get(*name) {
            return Err(FsError::IsADirectory(path.to_string()));
        }
        dir.insert(name.to_string(), Node::File(data.to_vec()));
        Ok(())
    }

    fn read_file(&self, path: &str) -> FsResult<Vec<u8>> {
        match self.node(path)? {
            Some(Node::File(data)) => Ok(data.clone()),
            _ => Err(FsError::IsADirectory(path.to_string())),
        }
    }

    fn read_dir(&self, path: &str) -> FsResult<Vec<String>> {
        let parts = components(path)?;
        Ok(self.dir(path, &parts)?.keys().cloned().collect())
    }

    fn stat(&self, path: &str) -> FsResult<Metadata> {
        Ok(match self.node(path)? {
            None | Some(Node::Dir(_)) => Metadata {
                is_dir: true,
                len: 0,
            },
            Some(Node::File(data)) => Metadata {
                is_dir: false,
                len: data.len() as u64,
            },
        })
    }

    fn unlink(&mut self, path: &str) -> FsResult<()> {
        let parts = components(path)?;
        let Some((name, parent)) = parts.split_last() else {
            return Err(FsError::IsADirectory(path.to_string()));
        };
        let dir = self.dir_mut(path, parent)?;
        match dir.get(*name) {
            None => Err(FsError::NotFound(path.to_string())),
            Some(Node::Dir(_)) => Err(FsError::IsADirectory(path.to_string())),
            Some(Node::File(_)) => {
                dir.remove(*name);
                Ok(())
            }
        }
    }

    fn rmdir(&mut self, path: &str) -> FsResult<()> {
        let parts = components(path)?;
        let Some((name, parent)) = parts.split_last() else {
            return Err(FsError::InvalidPath(path.to_string()));
        };
        let dir = self.dir_mut(path, parent)?;
        match dir.get(*name) {
            None => Err(FsError::NotFound(path.to_string())),
            Some(Node::File(_)) => Err(FsError::NotADirectory(path.to_string())),
            Some(Node::Dir(children)) if !children.is_empty() => {
                Err(FsError::NotEmpty(path.to_string()))
            }
            Some(Node::Dir(_)) => {
                dir.remove(*name);
                Ok(())
            }
        }
    }

    fn clear_root(&mut self) -> FsResult<()> {
        self.root.clear();
        Ok(())
    }
}
