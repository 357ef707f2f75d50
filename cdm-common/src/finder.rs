//! Locating export files in a directory tree

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lazily yield every file under `root` whose base name is exactly `file_name`
///
/// Results come in directory walk order. Entries that cannot be read are
/// skipped with a warning.
pub fn find_file_locally<'a>(
    file_name: &'a str,
    root: &Path,
) -> impl Iterator<Item = PathBuf> + 'a {
    find_files_matching(root, move |path| {
        path.file_name().map(|n| n == file_name).unwrap_or(false)
    })
}

/// Lazily yield every file under `root` accepted by `predicate`
pub fn find_files_matching<'a, F>(
    root: &Path,
    predicate: F,
) -> impl Iterator<Item = PathBuf> + 'a
where
    F: Fn(&Path) -> bool + 'a,
{
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Error accessing entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(move |path| predicate(path))
}
