//! Record stores for the two export formats
//!
//! Both stores load their file eagerly when built and are read-only
//! afterwards. They share the [`RecordSource`] capability so callers can
//! treat either export uniformly.

pub mod markup;
pub mod tabular;

pub use markup::{MarkupRecord, MarkupRecordStore, PageRecord};
pub use tabular::{TabularRecord, TabularRecordStore};

use std::fmt::Display;
use std::path::Path;

use crate::error::Result;

/// Capability shared by the tabular and markup stores
pub trait RecordSource: Sized {
    /// Record type produced by this store
    type Record;

    /// Parse the export at `path` into a store
    fn load_data(path: &Path) -> Result<Self>;

    /// First record whose identifier, compared as a string, equals `id`
    fn get_record(&self, id: impl Display) -> Result<&Self::Record>;

    /// Sorted field names known to the store
    fn fields(&self) -> Result<Vec<String>>;

    fn has_field(&self, name: &str) -> bool;

    /// Whether a record with this identifier exists
    fn contains(&self, id: impl Display) -> bool {
        self.get_record(id).is_ok()
    }

    /// Number of top-level records
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
