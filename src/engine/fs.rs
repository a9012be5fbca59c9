// wfrun — Filesystem verbs (touch, copy, mkdir, set_permissions)

use super::error::{EngineError, EngineResult};
use std::fs::OpenOptions;
use std::path::Path;

/// Whether a verb changed anything on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOutcome {
    Created,
    AlreadyExists,
}

fn fs_err(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> EngineError {
    let path = path.to_path_buf();
    move |source| EngineError::Filesystem {
        action,
        path,
        source,
    }
}

/// Create an empty file unless something already exists at `path`.
pub fn touch(path: &Path) -> EngineResult<FsOutcome> {
    if path.exists() {
        return Ok(FsOutcome::AlreadyExists);
    }
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(fs_err("create", path))?;
    Ok(FsOutcome::Created)
}

/// Byte-copy `source` to `dest`. An existing `dest` is never overwritten.
///
/// A failed copy removes the partial `dest`, so a rerun tries again instead
/// of skipping.
pub fn copy(source: &Path, dest: &Path) -> EngineResult<FsOutcome> {
    if !source.exists() {
        return Err(EngineError::SourceNotFound {
            path: source.to_path_buf(),
        });
    }
    if !source.is_file() {
        return Err(EngineError::NotAFile {
            path: source.to_path_buf(),
        });
    }
    if dest.exists() {
        return Ok(FsOutcome::AlreadyExists);
    }

    let mut reader = std::fs::File::open(source).map_err(fs_err("open", source))?;
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .map_err(fs_err("create", dest))?;
    if let Err(e) = std::io::copy(&mut reader, &mut writer) {
        drop(writer);
        if let Err(cleanup) = std::fs::remove_file(dest) {
            tracing::warn!(path = %dest.display(), error = %cleanup, "Could not remove partial copy");
        }
        return Err(fs_err("copy to", dest)(e));
    }
    Ok(FsOutcome::Created)
}

/// Create `path` and any missing parents.
pub fn mkdir(path: &Path) -> EngineResult<FsOutcome> {
    if path.exists() {
        return Ok(FsOutcome::AlreadyExists);
    }
    std::fs::create_dir_all(path).map_err(fs_err("create directory", path))?;
    Ok(FsOutcome::Created)
}

#[cfg(unix)]
pub fn set_permissions(path: &Path, mode: u32) -> EngineResult<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .map_err(fs_err("set permissions for", path))
}

/// Only the owner-write bit is meaningful here: it maps to the read-only flag.
#[cfg(not(unix))]
pub fn set_permissions(path: &Path, mode: u32) -> EngineResult<()> {
    let mut perms = std::fs::metadata(path)
        .map_err(fs_err("set permissions for", path))?
        .permissions();
    perms.set_readonly(mode & 0o200 == 0);
    std::fs::set_permissions(path, perms).map_err(fs_err("set permissions for", path))
}
