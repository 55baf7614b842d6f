//! Virtual filesystem bridge.
//!
//! Structural translation between logical `(path, bytes)` pairs and
//! directory/file operations on an engine's filesystem. No caching here.

use flatrun_engine::fs::{components, join};
use flatrun_engine::{FsError, FsResult, VirtualFs};
use std::collections::BTreeMap;

/// Create `dir` and every missing ancestor. Existing directories are fine.
pub fn create_dir_all(fs: &mut dyn VirtualFs, dir: &str) -> FsResult<()> {
    let mut cur = String::new();
    for part in components(dir)? {
        cur.push('/');
        cur.push_str(part);
        match fs.mkdir(&cur) {
            Ok(()) => {}
            Err(e) if e.is_already_exists() => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Write `data` at `path`, creating intermediate directories first.
pub fn mount(fs: &mut dyn VirtualFs, path: &str, data: &[u8]) -> FsResult<()> {
    let parts = components(path)?;
    if parts.is_empty() {
        return Err(FsError::IsADirectory(path.to_string()));
    }
    create_dir_all(fs, flatrun_engine::fs::parent_dir(path))?;
    fs.write_file(path, data)
}

/// Mount files in order; a later entry overwrites an earlier one at the
/// same path.
pub fn mount_many<'a, I>(fs: &mut dyn VirtualFs, files: I) -> FsResult<()>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    for (path, data) in files {
        mount(fs, path, data)?;
    }
    Ok(())
}

/// Every regular file under `root`, depth-first.
///
/// Directories are never returned. If `root` is itself a file, the result
/// is just `root`.
pub fn list_all(fs: &dyn VirtualFs, root: &str) -> FsResult<Vec<String>> {
    let mut files = Vec::new();
    traverse(fs, root, &mut files)?;
    Ok(files)
}

fn traverse(fs: &dyn VirtualFs, path: &str, files: &mut Vec<String>) -> FsResult<()> {
    if fs.stat(path)?.is_dir {
        for name in fs.read_dir(path)? {
            traverse(fs, &join(path, &name), files)?;
        }
    } else {
        files.push(path.to_string());
    }
    Ok(())
}

/// Every file under `dir` as UTF-8 text, keyed by path relative to `dir`.
pub fn walk_relative(fs: &dyn VirtualFs, dir: &str) -> FsResult<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    walk(fs, dir, "", &mut out)?;
    Ok(out)
}

fn walk(
    fs: &dyn VirtualFs,
    path: &str,
    base: &str,
    out: &mut BTreeMap<String, String>,
) -> FsResult<()> {
    for name in fs.read_dir(path)? {
        let full = join(path, &name);
        let rel = if base.is_empty() {
            name
        } else {
            format!("{base}/{name}")
        };
        if fs.stat(&full)?.is_dir {
            walk(fs, &full, &rel, out)?;
        } else {
            out.insert(rel, fs.read_to_string(&full)?);
        }
    }
    Ok(())
}
