//! Read-only record views
//!
//! A [`Record`] is the field-name keyed view handed to callers for both
//! tabular rows and markup items. Values keep their multiplicity until they
//! are rendered; rendering joins multi-valued fields with the record's
//! separator. Records have no mutating API. The only derived record, one
//! carrying a `group_id`, is produced by [`Record::with_group_id`], which
//! consumes the original and returns a new value.

use cdm_common::config::DEFAULT_SEPARATOR;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{MetadataError, Result};

/// Identifier column of the tabular export
pub const TABULAR_ID_FIELD: &str = "CONTENTdm number";
/// Identifier element of a markup item
pub const MARKUP_ID_FIELD: &str = "cdmid";
/// Page title element inside a markup page
pub const PAGE_TITLE_FIELD: &str = "pagetitle";
/// Page pointer element inside a markup page; refers to a tabular identifier
pub const PAGE_POINTER_FIELD: &str = "pageptr";
/// Synthetic field tying a parent record to its expanded pages
pub const GROUP_ID_FIELD: &str = "group_id";

/// Multi-valued field mapping used by markup items and pages
pub type FieldMap = BTreeMap<String, Vec<String>>;

/// One field's value, single or multi-valued
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Single(String),
    Multi(Vec<String>),
}

impl FieldValue {
    /// Render as one string
    ///
    /// A list of one is unwrapped, longer lists are joined with `separator`.
    pub fn render(&self, separator: &str) -> Cow<'_, str> {
        match self {
            FieldValue::Single(value) => Cow::Borrowed(value),
            FieldValue::Multi(values) if values.len() == 1 => Cow::Borrowed(&values[0]),
            FieldValue::Multi(values) => Cow::Owned(values.join(separator)),
        }
    }

    /// Raw list form; `None` for single-valued fields
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::Single(_) => None,
            FieldValue::Multi(values) => Some(values),
        }
    }
}

/// Immutable field-name keyed view over one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    data: BTreeMap<String, FieldValue>,
    pages: Vec<FieldMap>,
    separator: String,
}

impl Record {
    /// Build a record rendered with the default separator
    pub fn new(data: BTreeMap<String, FieldValue>, pages: Vec<FieldMap>) -> Self {
        Self::with_separator(data, pages, DEFAULT_SEPARATOR)
    }

    pub fn with_separator(
        data: BTreeMap<String, FieldValue>,
        pages: Vec<FieldMap>,
        separator: impl Into<String>,
    ) -> Self {
        Self {
            data,
            pages,
            separator: separator.into(),
        }
    }

    /// Rendered value of `name`
    ///
    /// # Errors
    ///
    /// `FieldNotFound` if the record has no such field.
    pub fn get(&self, name: &str) -> Result<Cow<'_, str>> {
        self.data
            .get(name)
            .map(|value| value.render(&self.separator))
            .ok_or_else(|| MetadataError::FieldNotFound(name.to_string()))
    }

    /// Raw list form of `name`
    ///
    /// Returns `None` both when the field is missing and when it is
    /// single-valued: a scalar field has no list representation.
    pub fn as_list(&self, name: &str) -> Option<&[String]> {
        self.data.get(name).and_then(FieldValue::as_list)
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    /// Field names in sorted order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `(name, rendered value)` pairs in field order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Cow<'_, str>)> {
        self.data
            .iter()
            .map(|(name, value)| (name.as_str(), value.render(&self.separator)))
    }

    /// Underlying field mapping
    pub fn data(&self) -> &BTreeMap<String, FieldValue> {
        &self.data
    }

    /// Fresh copies of the nested page mappings
    pub fn pages(&self) -> Vec<FieldMap> {
        self.pages.clone()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// New record equal to this one plus a `group_id` field
    pub fn with_group_id(mut self, group_id: usize) -> Self {
        self.data.insert(
            GROUP_ID_FIELD.to_string(),
            FieldValue::Single(group_id.to_string()),
        );
        self
    }

    /// The `group_id` stamped during join iteration, if any
    pub fn group_id(&self) -> Option<usize> {
        match self.data.get(GROUP_ID_FIELD)? {
            FieldValue::Single(value) => value.parse().ok(),
            FieldValue::Multi(values) => values.first()?.parse().ok(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}: {:?}", name, value)?;
        }
        write!(f, "}}")?;
        if !self.pages.is_empty() {
            write!(f, " [{} pages]", self.pages.len())?;
        }
        Ok(())
    }
}

/// Serializes as a map of field name to rendered value
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.data.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}
