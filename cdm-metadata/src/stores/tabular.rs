//! Tab-separated export store
//!
//! The first line is the header; every following line becomes one
//! [`TabularRecord`] in file order. Rows are assumed to carry a unique
//! `CONTENTdm number`; uniqueness is not verified.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::RecordSource;
use crate::error::{MetadataError, Result};
use crate::record::{FieldValue, Record, TABULAR_ID_FIELD};

/// One row of the tabular export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TabularRecord {
    values: BTreeMap<String, String>,
}

impl TabularRecord {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Value of the `CONTENTdm number` column
    pub fn id(&self) -> Option<&str> {
        self.get(TABULAR_ID_FIELD)
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy of this row reduced to `names`
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> TabularRecord {
        let values = names
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                self.values
                    .get(name)
                    .map(|value| (name.to_string(), value.clone()))
            })
            .collect();
        TabularRecord { values }
    }
}

impl From<&TabularRecord> for Record {
    fn from(row: &TabularRecord) -> Self {
        let data = row
            .values
            .iter()
            .map(|(k, v)| (k.clone(), FieldValue::Single(v.clone())))
            .collect();
        Record::new(data, Vec::new())
    }
}

/// All rows of one tab-separated export
#[derive(Debug, Clone)]
pub struct TabularRecordStore {
    path: PathBuf,
    records: Vec<TabularRecord>,
}

impl TabularRecordStore {
    /// Load and parse the export at `path`
    ///
    /// # Errors
    ///
    /// `InputNotFound` if the file does not exist; `Tabular` if a row does
    /// not match the header's column count or the file is not valid UTF-8.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MetadataError::InputNotFound(path.to_path_buf()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_path(path)?;
        let headers = reader.headers()?.clone();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let values = headers
                .iter()
                .zip(row.iter())
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect();
            records.push(TabularRecord { values });
        }

        debug!(
            path = %path.display(),
            records = records.len(),
            columns = headers.len(),
            "Loaded tabular export"
        );

        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    /// Build a store from rows already in memory
    pub fn from_records(records: Vec<TabularRecord>) -> Self {
        Self {
            path: PathBuf::new(),
            records,
        }
    }

    /// Source file the store was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows in file order; every call starts from the first row
    pub fn iter(&self) -> std::slice::Iter<'_, TabularRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[TabularRecord] {
        &self.records
    }

    /// Lazily yield every row reduced to `names`
    ///
    /// All names are checked before anything is yielded.
    ///
    /// # Errors
    ///
    /// `FieldNotFound` naming the first requested field the store lacks.
    pub fn with_fields<'a, S: AsRef<str>>(
        &'a self,
        names: &'a [S],
    ) -> Result<impl Iterator<Item = TabularRecord> + 'a> {
        let known: BTreeSet<&str> = self.header_fields().collect();
        for name in names {
            let name: &str = name.as_ref();
            if !known.contains(name) {
                return Err(MetadataError::FieldNotFound(name.to_string()));
            }
        }
        Ok(self.records.iter().map(move |row| row.select(names)))
    }

    // The header is captured once at load time, so the first row carries
    // the full field set.
    fn header_fields(&self) -> impl Iterator<Item = &str> {
        self.records.first().into_iter().flat_map(TabularRecord::fields)
    }
}

impl RecordSource for TabularRecordStore {
    type Record = TabularRecord;

    fn load_data(path: &Path) -> Result<Self> {
        Self::open(path)
    }

    /// Linear scan, O(n) per lookup
    fn get_record(&self, id: impl Display) -> Result<&TabularRecord> {
        let id = id.to_string();
        self.records
            .iter()
            .find(|row| row.id() == Some(id.as_str()))
            .ok_or(MetadataError::RecordNotFound(id))
    }

    /// Sorted header names
    ///
    /// # Errors
    ///
    /// `NoRecords` if the export has no data rows.
    fn fields(&self) -> Result<Vec<String>> {
        let first = self.records.first().ok_or(MetadataError::NoRecords)?;
        Ok(first.fields().map(str::to_string).collect())
    }

    fn has_field(&self, name: &str) -> bool {
        self.records
            .first()
            .map(|row| row.contains_field(name))
            .unwrap_or(false)
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

impl<'a> IntoIterator for &'a TabularRecordStore {
    type Item = &'a TabularRecord;
    type IntoIter = std::slice::Iter<'a, TabularRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
