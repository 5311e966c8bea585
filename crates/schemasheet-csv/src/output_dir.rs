//! Output directory creation
//!
//! An export never writes into a directory that already exists: the first
//! free name out of `base`, `base_1`, `base_2`, … is created and returned.

use crate::CsvError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Create a new directory at `base` or the first free `base_N` sibling
///
/// Missing parent directories are created. Creation itself is atomic per
/// candidate, so two concurrent exports never share a directory.
pub fn create_unique_dir(base: &Path) -> Result<PathBuf, CsvError> {
    let name = base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CsvError::InvalidPath(base.to_path_buf()))?;

    if let Some(parent) = base.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CsvError::fs(parent, e))?;
    }

    let mut suffix = 0u32;
    loop {
        let candidate = if suffix == 0 {
            base.to_path_buf()
        } else {
            base.with_file_name(format!("{}_{}", name, suffix))
        };

        match std::fs::create_dir(&candidate) {
            Ok(()) => {
                debug!(path = %candidate.display(), "created output directory");
                return Ok(candidate);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(CsvError::fs(candidate, e)),
        }
    }
}
