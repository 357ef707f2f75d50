//! Export file classification by extension

use std::fmt;
use std::path::Path;

/// Kind of metadata export a path refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Tab-separated export (`.tsv`)
    Tabular,
    /// Hierarchical XML export (`.xml`)
    Markup,
    /// Anything else
    Unsupported,
}

impl FileKind {
    /// Classify a path by its extension, ignoring case
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("tsv") => FileKind::Tabular,
            Some("xml") => FileKind::Markup,
            _ => FileKind::Unsupported,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileKind::Tabular => "tabular (.tsv)",
            FileKind::Markup => "markup (.xml)",
            FileKind::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}
