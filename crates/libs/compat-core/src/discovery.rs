use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use globset::Glob;
use tempfile::NamedTempFile;

use crate::error::{CompatError, Result};

/// Report files directly under `dir` whose file name matches `pattern`,
/// sorted by path. A missing directory has no reports.
pub fn discover_reports(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = Glob::new(pattern)
        .map_err(|err| CompatError::Config { path: dir.to_path_buf(), detail: err.to_string() })?
        .compile_matcher();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            log::warn!("report directory {} does not exist", dir.display());
            return Ok(Vec::new());
        }
        Err(err) => return Err(CompatError::io(dir, err)),
    };

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| CompatError::io(dir, err))?.path();
        if path.is_file() && path.file_name().is_some_and(|name| matcher.is_match(name)) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

pub fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| CompatError::io(path, err))
}

/// Replaces `path` with `contents` through a temp file in the same directory,
/// so readers see either the old or the new document. An existing target
/// keeps its permissions.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|err| CompatError::io(dir, err))?;
    tmp.write_all(contents.as_bytes()).map_err(|err| CompatError::io(tmp.path(), err))?;
    match fs::metadata(path) {
        Ok(existing) => tmp
            .as_file()
            .set_permissions(existing.permissions())
            .map_err(|err| CompatError::io(tmp.path(), err))?,
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => return Err(CompatError::io(path, err)),
    }
    tmp.as_file().sync_all().map_err(|err| CompatError::io(tmp.path(), err))?;
    tmp.persist(path).map_err(|err| CompatError::io(path, err.error))?;
    Ok(())
}
