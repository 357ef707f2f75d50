//! Scoped local copies of export files
//!
//! Exports often live on removable or network media. A [`TempCopy`] copies
//! one file into a private temporary directory and removes that directory
//! when dropped, whether the scope ends normally, through `?`, or by
//! unwinding.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// A temporary local copy of a single file
#[derive(Debug)]
pub struct TempCopy {
    source: PathBuf,
    copy: PathBuf,
    // Dropping the directory removes the copy
    _dir: TempDir,
}

impl TempCopy {
    /// Copy `source` into a fresh temporary directory under the same file name
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if `source` does not exist, or
    /// `Error::Io` if the directory cannot be created or the copy fails.
    pub fn new(source: impl AsRef<Path>) -> Result<Self> {
        let source = source.as_ref();
        if !source.exists() {
            return Err(Error::NotFound(source.to_path_buf()));
        }
        let source = std::path::absolute(source)?;
        let file_name = source
            .file_name()
            .ok_or_else(|| Error::InvalidInput(format!("Not a file: {}", source.display())))?
            .to_owned();

        let dir = TempDir::new()?;
        let copy = dir.path().join(file_name);
        std::fs::copy(&source, &copy)?;

        debug!(
            source = %source.display(),
            copy = %copy.display(),
            "Created temporary copy"
        );

        Ok(Self {
            source,
            copy,
            _dir: dir,
        })
    }

    /// Absolute path of the original file
    pub fn source_file(&self) -> &Path {
        &self.source
    }

    /// Path of the local copy, valid until `self` is dropped
    pub fn path(&self) -> &Path {
        &self.copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_is_not_found() {
        let result = TempCopy::new("/nonexistent/export.tsv");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
