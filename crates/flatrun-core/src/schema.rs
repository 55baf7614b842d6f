//! Schema input data model.

use crate::error::{Result, RunnerError};
use bytes::Bytes;
use flatrun_engine::fs::{components, parent_dir};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Content of a schema file: text or raw bytes.
///
/// Equality is byte equality regardless of variant, since both mount to the
/// same file.
#[derive(Debug, Clone)]
pub enum FileContent {
    /// UTF-8 text.
    Text(Arc<str>),
    /// Raw bytes.
    Bytes(Bytes),
}

impl FileContent {
    /// The bytes written to the virtual filesystem.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// True if the content is empty.
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl PartialEq for FileContent {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.as_bytes(), other.as_bytes());
        // Shared buffers compare equal without a scan
        (a.as_ptr() == b.as_ptr() && a.len() == b.len()) || a == b
    }
}

impl Eq for FileContent {}

impl From<&str> for FileContent {
    fn from(text: &str) -> Self {
        Self::Text(Arc::from(text))
    }
}

impl From<String> for FileContent {
    fn from(text: String) -> Self {
        Self::Text(Arc::from(text))
    }
}

impl From<Vec<u8>> for FileContent {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

impl From<&[u8]> for FileContent {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl From<Bytes> for FileContent {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

/// A schema tree: an entry file plus every file it may reference.
///
/// Paths are absolute, POSIX-style and case-sensitive. They are mounted
/// verbatim; resolving includes is the compiler's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaInput {
    entry: String,
    files: BTreeMap<String, FileContent>,
}

impl SchemaInput {
    /// Build a schema input, checking that every path is absolute and that
    /// `entry` is one of the files.
    pub fn new<I, P, C>(entry: impl Into<String>, files: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<FileContent>,
    {
        let entry = entry.into();
        let mut map = BTreeMap::new();
        for (path, content) in files {
            let path = path.into();
            check_path(&path)?;
            map.insert(path, content.into());
        }

        if !map.contains_key(&entry) {
            return Err(RunnerError::InvalidSchema(format!(
                "entry {entry} is not one of the schema files"
            )));
        }

        Ok(Self { entry, files: map })
    }

    /// Path of the root schema file.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Every schema file, keyed by path.
    pub fn files(&self) -> &BTreeMap<String, FileContent> {
        &self.files
    }

    /// Insert or replace a single file.
    pub fn set_file(&mut self, path: impl Into<String>, content: impl Into<FileContent>) -> Result<()> {
        let path = path.into();
        check_path(&path)?;
        self.files.insert(path, content.into());
        Ok(())
    }

    /// Unique parent directories of every file, used as `-I` search paths.
    pub fn include_dirs(&self) -> Vec<String> {
        include_dirs(self.files.keys().map(String::as_str))
    }
}

/// Paths must be canonical: absolute, no empty segments, no trailing slash.
/// Two spellings of one file would otherwise become two cache keys.
fn check_path(path: &str) -> Result<()> {
    match components(path) {
        Ok(parts) if !parts.is_empty() && parts.len() == path.split('/').count() - 1 => Ok(()),
        _ => Err(RunnerError::InvalidSchema(format!(
            "schema path must be a canonical absolute file path, got {path:?}"
        ))),
    }
}

/// Deduplicated, sorted parent directories of `paths`. Top-level files map
/// to `/`.
pub fn include_dirs<'a>(paths: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    paths
        .into_iter()
        .map(|path| parent_dir(path).to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
