//! Resolving export paths before a join
//!
//! Paths given on the command line are used as-is when they exist.
//! Otherwise the base name is looked up under a search root, which is how
//! exports on mounted media are usually referred to.

use cdm_common::{find_file_locally, TempCopy};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{MetadataError, Result};

/// Resolve one export path
///
/// # Errors
///
/// `InputNotFound` if `file` does not exist and no file with its base name
/// exists under `search_root`.
pub fn locate_input(file: &Path, search_root: Option<&Path>) -> Result<PathBuf> {
    if file.exists() {
        return Ok(file.to_path_buf());
    }

    let (Some(root), Some(name)) = (search_root, file.file_name().and_then(|n| n.to_str())) else {
        return Err(MetadataError::InputNotFound(file.to_path_buf()));
    };

    let mut matches = find_file_locally(name, root);
    let found = matches
        .next()
        .ok_or_else(|| MetadataError::InputNotFound(file.to_path_buf()))?;

    if matches.next().is_some() {
        debug!(name, root = %root.display(), "Several matches, using the first");
    }
    info!("Located {} at {}", name, found.display());
    Ok(found)
}

/// Resolve every export path, keeping their order
pub fn locate_inputs<P: AsRef<Path>>(files: &[P], search_root: Option<&Path>) -> Result<Vec<PathBuf>> {
    files
        .iter()
        .map(|file| locate_input(file.as_ref(), search_root))
        .collect()
}

/// Local copies of a set of exports
///
/// The copies are removed when this value is dropped, so an engine built
/// from [`LocalInputs::paths`] must be built while it is alive. Stores read
/// their files completely at construction, so the engine may outlive it.
#[derive(Debug)]
pub struct LocalInputs {
    copies: Vec<TempCopy>,
}

impl LocalInputs {
    pub fn new<P: AsRef<Path>>(files: &[P]) -> Result<Self> {
        let copies = files
            .iter()
            .map(|file| TempCopy::new(file))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { copies })
    }

    /// Paths of the local copies, in input order
    pub fn paths(&self) -> Vec<&Path> {
        self.copies.iter().map(TempCopy::path).collect()
    }

    pub fn sources(&self) -> impl Iterator<Item = &Path> {
        self.copies.iter().map(TempCopy::source_file)
    }
}
