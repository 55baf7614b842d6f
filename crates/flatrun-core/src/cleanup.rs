//! Best-effort removal of transient artifacts.
//!
//! Cleanup never fails the operation it follows. Every failure is captured
//! in a [`CleanupReport`] and logged; a path that is already gone counts as
//! cleaned.

use flatrun_engine::fs::join;
use flatrun_engine::{FsError, VirtualFs};

/// A single path that could not be removed.
#[derive(Debug)]
pub struct CleanupFailure {
    /// Path that was being removed.
    pub path: String,
    /// Why removal failed.
    pub error: FsError,
}

/// Outcome of a best-effort cleanup pass.
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Number of files and directories removed.
    pub removed: usize,
    /// Paths that could not be removed.
    pub failures: Vec<CleanupFailure>,
}

impl CleanupReport {
    /// True if nothing failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Emit one warning per failure.
    pub fn log(&self, operation: &str) {
        for failure in &self.failures {
            tracing::warn!(
                operation,
                path = %failure.path,
                error = %failure.error,
                "Cleanup failed"
            );
        }
    }

    fn record(&mut self, path: &str, result: Result<(), FsError>) {
        match result {
            Ok(()) => {
                self.removed += 1;
                tracing::trace!(path, "Removed");
            }
            Err(e) if e.is_not_found() => {}
            Err(error) => self.failures.push(CleanupFailure {
                path: path.to_string(),
                error,
            }),
        }
    }
}

/// Accumulates best-effort removals against one filesystem.
pub struct Cleanup<'a> {
    fs: &'a mut dyn VirtualFs,
    report: CleanupReport,
}

impl<'a> Cleanup<'a> {
    /// Start a cleanup pass.
    pub fn new(fs: &'a mut dyn VirtualFs) -> Self {
        Self {
            fs,
            report: CleanupReport::default(),
        }
    }

    /// Remove a file.
    pub fn unlink(&mut self, path: &str) -> &mut Self {
        let result = self.fs.unlink(path);
        self.report.record(path, result);
        self
    }

    /// Remove the files directly inside `dir`, then `dir` itself.
    pub fn remove_dir(&mut self, dir: &str) -> &mut Self {
        match self.fs.read_dir(dir) {
            Ok(names) => {
                for name in names {
                    self.unlink(&join(dir, &name));
                }
            }
            Err(e) => self.report.record(dir, Err(e)),
        }
        let result = self.fs.rmdir(dir);
        self.report.record(dir, result);
        self
    }

    /// Remove `dir` and everything below it.
    pub fn remove_tree(&mut self, dir: &str) -> &mut Self {
        match self.fs.read_dir(dir) {
            Ok(names) => {
                for name in names {
                    let path = join(dir, &name);
                    match self.fs.stat(&path) {
                        Ok(meta) if meta.is_dir => {
                            self.remove_tree(&path);
                        }
                        Ok(_) => {
                            self.unlink(&path);
                        }
                        Err(e) => self.report.record(&path, Err(e)),
                    }
                }
            }
            Err(e) => self.report.record(dir, Err(e)),
        }
        let result = self.fs.rmdir(dir);
        self.report.record(dir, result);
        self
    }

    /// Remove `dir` only if it has no entries left. The root is never
    /// removed.
    pub fn rmdir_if_empty(&mut self, dir: &str) -> &mut Self {
        if dir == "/" {
            return self;
        }
        match self.fs.read_dir(dir) {
            Ok(names) if names.is_empty() => {
                let result = self.fs.rmdir(dir);
                self.report.record(dir, result);
            }
            Ok(_) => {}
            Err(e) => self.report.record(dir, Err(e)),
        }
        self
    }

    /// Finish the pass and return what happened.
    pub fn finish(self) -> CleanupReport {
        self.report
    }
}

/// Reset an engine filesystem before the instance is released.
///
/// Unmounts and removes every top-level entry, drops open stream handles,
/// then clears the root. Only the root reset is reported; the per-entry
/// steps commonly fail on non-empty directories and are traced only.
pub fn reset_instance(fs: &mut dyn VirtualFs) -> CleanupReport {
    let mut report = CleanupReport::default();

    match fs.read_dir("/") {
        Ok(names) => {
            for name in names {
                let path = join("/", &name);
                if let Err(e) = fs.unmount(&path) {
                    tracing::trace!(path = %path, error = %e, "Unmount skipped");
                }
                if let Err(e) = fs.rmdir(&path) {
                    tracing::trace!(path = %path, error = %e, "Rmdir skipped");
                }
            }
        }
        Err(e) => tracing::trace!(error = %e, "Could not list root"),
    }

    fs.close_streams();
    let result = fs.clear_root();
    report.record("/", result);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::mount;
    use flatrun_engine::MemFs;

    #[test]
    fn test_missing_paths_are_not_failures() {
        let mut fs = MemFs::new();
        let mut cleanup = Cleanup::new(&mut fs);
        cleanup.unlink("/nope.json").remove_dir("/nope");
        let report = cleanup.finish();
        assert!(report.is_clean());
        assert_eq!(report.removed, 0);
    }

    #[test]
    fn test_remove_dir_unlinks_children() {
        let mut fs = MemFs::new();
        mount(&mut fs, "/out/a.mon", b"a").unwrap();
        mount(&mut fs, "/out/b.mon", b"b").unwrap();

        let mut cleanup = Cleanup::new(&mut fs);
        cleanup.remove_dir("/out");
        let report = cleanup.finish();
        assert!(report.is_clean());
        assert_eq!(report.removed, 3);
        assert!(!fs.exists("/out"));
    }

    #[test]
    fn test_remove_dir_reports_nested_failure() {
        let mut fs = MemFs::new();
        mount(&mut fs, "/out/nested/a.mon", b"a").unwrap();

        let mut cleanup = Cleanup::new(&mut fs);
        cleanup.remove_dir("/out");
        let report = cleanup.finish();
        // The nested directory can't be unlinked, so neither can its parent
        assert_eq!(report.failures.len(), 2);
        assert!(fs.exists("/out/nested/a.mon"));
    }

    #[test]
    fn test_remove_tree() {
        let mut fs = MemFs::new();
        mount(&mut fs, "/out/x/rust/a.rs", b"a").unwrap();
        mount(&mut fs, "/out/x/b.rs", b"b").unwrap();

        let mut cleanup = Cleanup::new(&mut fs);
        cleanup.remove_tree("/out/x");
        assert!(cleanup.finish().is_clean());
        assert!(!fs.exists("/out/x"));
        assert!(fs.exists("/out"));
    }

    #[test]
    fn test_rmdir_if_empty_keeps_shared_dir() {
        let mut fs = MemFs::new();
        mount(&mut fs, "/data/other.json", b"{}").unwrap();
        fs.mkdir("/empty").unwrap();

        let mut cleanup = Cleanup::new(&mut fs);
        cleanup
            .rmdir_if_empty("/data")
            .rmdir_if_empty("/empty")
            .rmdir_if_empty("/");
        assert!(cleanup.finish().is_clean());
        assert!(fs.exists("/data/other.json"));
        assert!(!fs.exists("/empty"));
    }

    #[test]
    fn test_reset_instance_clears_everything() {
        let mut fs = MemFs::new();
        mount(&mut fs, "/schema/monster.fbs", b"table M {}").unwrap();
        mount(&mut fs, "/input.mon", b"\0").unwrap();
        fs.mkdir("/empty").unwrap();

        let report = reset_instance(&mut fs);
        assert!(report.is_clean());
        assert!(fs.read_dir("/").unwrap().is_empty());
    }
}
