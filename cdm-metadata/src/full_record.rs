//! Join result for one top-level item

use std::collections::BTreeSet;
use std::fmt;

use crate::record::{FieldMap, Record};

/// Object-level record plus its item-level (page) mappings
///
/// Identity is positional: a `FullRecord` is addressed by its index in the
/// engine's sequence, not by a natural key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullRecord {
    object_level: Record,
    item_level: Vec<FieldMap>,
}

impl FullRecord {
    pub fn new(object_level: Record, item_level: Vec<FieldMap>) -> Self {
        Self {
            object_level,
            item_level,
        }
    }

    pub fn object_level(&self) -> &Record {
        &self.object_level
    }

    pub fn item_level(&self) -> &[FieldMap] {
        &self.item_level
    }

    pub fn page_count(&self) -> usize {
        self.item_level.len()
    }

    /// Object-level field names plus every page's keys
    pub fn fields(&self) -> BTreeSet<String> {
        self.object_level
            .fields()
            .map(str::to_string)
            .chain(self.item_level.iter().flat_map(|page| page.keys().cloned()))
            .collect()
    }

    /// Page `index` with each multi-valued field joined by `separator`
    pub fn flatten_page(&self, index: usize, separator: &str) -> Option<Vec<(String, String)>> {
        self.item_level.get(index).map(|page| {
            page.iter()
                .map(|(name, values)| (name.clone(), values.join(separator)))
                .collect()
        })
    }
}

impl fmt::Display for FullRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "object_level: {}", self.object_level)?;
        write!(f, "item_level: [")?;
        for (i, page) in self.item_level.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", page)?;
        }
        write!(f, "]")
    }
}
