//! Schema cache.
//!
//! Remembers the schema tree last mounted into an engine's filesystem so
//! repeated encode/decode calls against the same schema skip remounting.
//! A hit requires the same entry and byte-identical content for every file;
//! anything else remounts the whole tree and replaces the cached state.

use crate::bridge;
use crate::schema::SchemaInput;
use flatrun_engine::fs::components;
use flatrun_engine::{FsResult, VirtualFs};

/// The schema currently mounted, plus its derived include directories.
#[derive(Debug, Clone)]
pub struct CachedSchemaState {
    schema: SchemaInput,
    include_dirs: Vec<String>,
    generation: u64,
}

impl CachedSchemaState {
    /// The mounted schema.
    pub fn schema(&self) -> &SchemaInput {
        &self.schema
    }

    /// Include directories computed when the schema was mounted.
    pub fn include_dirs(&self) -> &[String] {
        &self.include_dirs
    }

    /// Incremented on every wholesale replacement.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True if `schema` can reuse this state without remounting.
    pub fn matches(&self, schema: &SchemaInput) -> bool {
        let cached = self.schema.files();
        let incoming = schema.files();

        self.schema.entry() == schema.entry()
            && cached.len() == incoming.len()
            && cached
                .iter()
                .all(|(path, content)| incoming.get(path) == Some(content))
    }
}

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Calls that reused the mounted schema.
    pub hits: u64,
    /// Calls that mounted the schema.
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups that were hits, or 0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Owned, versioned cache of the mounted schema.
#[derive(Debug, Default)]
pub struct SchemaCache {
    state: Option<CachedSchemaState>,
    next_generation: u64,
    stats: CacheStats,
}

impl SchemaCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `schema` is mounted in `fs` and return its include
    /// directories.
    ///
    /// If mounting fails part-way the cache is left empty, so the next call
    /// remounts everything.
    pub fn ensure_mounted(
        &mut self,
        fs: &mut dyn VirtualFs,
        schema: &SchemaInput,
    ) -> FsResult<Vec<String>> {
        if let Some(state) = self.state.as_ref().filter(|s| s.matches(schema)) {
            self.stats.hits += 1;
            tracing::debug!(
                entry = %schema.entry(),
                generation = state.generation,
                "Schema cache hit"
            );
            return Ok(state.include_dirs.clone());
        }

        self.stats.misses += 1;
        self.state = None;
        tracing::debug!(
            entry = %schema.entry(),
            files = schema.files().len(),
            "Schema cache miss, mounting schema"
        );

        bridge::mount_many(
            fs,
            schema
                .files()
                .iter()
                .map(|(path, content)| (path.as_str(), content.as_bytes())),
        )?;

        self.next_generation += 1;
        let include_dirs = schema.include_dirs();
        self.state = Some(CachedSchemaState {
            schema: schema.clone(),
            include_dirs: include_dirs.clone(),
            generation: self.next_generation,
        });
        Ok(include_dirs)
    }

    /// True if `schema` is the one currently mounted.
    pub fn is_current(&self, schema: &SchemaInput) -> bool {
        self.state.as_ref().is_some_and(|s| s.matches(schema))
    }

    /// Forget the mounted schema; the next call remounts.
    pub fn invalidate(&mut self) {
        if self.state.take().is_some() {
            tracing::debug!("Schema cache invalidated");
        }
    }

    /// Forget the mounted schema if any of `paths` names one of its files.
    ///
    /// Paths are compared by components, so `/schema//a.fbs` still matches
    /// `/schema/a.fbs`. Returns true if the cache was dropped.
    pub fn invalidate_overlapping<'a>(&mut self, paths: impl IntoIterator<Item = &'a str>) -> bool {
        let Some(state) = self.state.as_ref() else {
            return false;
        };
        let files = state.schema.files();
        let overlaps = paths.into_iter().any(|path| match components(path) {
            Ok(parts) => files.contains_key(&format!("/{}", parts.join("/"))),
            Err(_) => false,
        });
        if overlaps {
            tracing::debug!("Schema file overwritten, dropping cached mount");
            self.invalidate();
        }
        overlaps
    }

    /// The cached state, if any.
    pub fn state(&self) -> Option<&CachedSchemaState> {
        self.state.as_ref()
    }

    /// Hit and miss counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
