//! Combined view over the tabular and markup exports
//!
//! [`MetadataJoinEngine`] accepts a tabular export, a markup export, or
//! both, and exposes them as one flat record stream: every top-level item
//! followed by one merged record per page, all stamped with the same
//! `group_id`.
//!
//! Merge precedence for a page record, highest first:
//! 1. the page's own fields (lists joined with the configured separator)
//! 2. the parent's object-level fields
//! 3. the tabular row the page's `pageptr` refers to

use cdm_common::config::JoinSettings;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{MetadataError, Result};
use crate::file_kind::FileKind;
use crate::full_record::FullRecord;
use crate::record::{
    FieldMap, FieldValue, Record, GROUP_ID_FIELD, MARKUP_ID_FIELD, PAGE_POINTER_FIELD,
};
use crate::stores::{MarkupRecordStore, RecordSource, TabularRecord, TabularRecordStore};

/// Join engine over one or both exports of a collection
#[derive(Debug, Clone)]
pub struct MetadataJoinEngine {
    tabular: Option<TabularRecordStore>,
    markup: Option<MarkupRecordStore>,
    records: Vec<FullRecord>,
    settings: JoinSettings,
}

impl MetadataJoinEngine {
    /// Build an engine from export paths with default settings
    ///
    /// See [`MetadataJoinEngine::with_settings`].
    pub fn open<P: AsRef<Path>>(files: &[P]) -> Result<Self> {
        Self::with_settings(files, JoinSettings::default())
    }

    /// Build an engine from export paths
    ///
    /// Paths are classified by extension in any order: `.tsv` is the
    /// tabular export, `.xml` the markup export.
    ///
    /// # Errors
    ///
    /// - `TooManyInputs` for more than two paths or two of the same kind
    /// - `UnsupportedFileType` for any other extension
    /// - `MissingInputs` when no path is given
    /// - `InputNotFound` if either path does not exist, before anything is parsed
    /// - a parse error from either store
    /// - `RecordMismatch` when both are given and their counts disagree
    pub fn with_settings<P: AsRef<Path>>(files: &[P], settings: JoinSettings) -> Result<Self> {
        let (tabular_path, markup_path) = classify_inputs(files)?;
        for path in tabular_path.iter().chain(markup_path.iter()) {
            if !path.exists() {
                return Err(MetadataError::InputNotFound(path.clone()));
            }
        }

        let tabular = tabular_path.map(TabularRecordStore::open).transpose()?;
        let markup = markup_path.map(MarkupRecordStore::open).transpose()?;

        Self::from_stores(tabular, markup, settings)
    }

    /// Build an engine from stores that are already loaded
    pub fn from_stores(
        tabular: Option<TabularRecordStore>,
        markup: Option<MarkupRecordStore>,
        settings: JoinSettings,
    ) -> Result<Self> {
        let records = match (&tabular, &markup) {
            (Some(tabular), Some(markup)) => join_both(tabular, markup, &settings.separator)?,
            (None, Some(markup)) => markup
                .iter()
                .map(|item| {
                    let pages = item.pages().iter().map(|p| p.as_map().clone()).collect();
                    FullRecord::new(item.to_record(&settings.separator), pages)
                })
                .collect(),
            (Some(tabular), None) => tabular
                .iter()
                .map(|row| FullRecord::new(tabular_view(row, &settings.separator), Vec::new()))
                .collect(),
            (None, None) => return Err(MetadataError::MissingInputs),
        };

        let engine = Self {
            tabular,
            markup,
            records,
            settings,
        };

        if engine.settings.strict_page_pointers {
            engine.validate_page_pointers()?;
        }

        debug!(
            records = engine.records.len(),
            length = engine.len(),
            tabular = engine.tabular.is_some(),
            markup = engine.markup.is_some(),
            "Built metadata join engine"
        );
        Ok(engine)
    }

    /// Every field name a yielded record can carry, plus `group_id`
    pub fn fields(&self) -> BTreeSet<String> {
        let mut fields: BTreeSet<String> = self.records.iter().flat_map(FullRecord::fields).collect();
        fields.insert(GROUP_ID_FIELD.to_string());
        fields
    }

    pub fn has_field(&self, name: &str) -> bool {
        name == GROUP_ID_FIELD || self.records.iter().any(|r| r.fields().contains(name))
    }

    /// Number of records the stream yields: items plus their pages
    pub fn len(&self) -> usize {
        self.records.len() + self.records.iter().map(FullRecord::page_count).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Joined items in order, before page expansion
    pub fn records(&self) -> &[FullRecord] {
        &self.records
    }

    pub fn tabular(&self) -> Option<&TabularRecordStore> {
        self.tabular.as_ref()
    }

    pub fn markup(&self) -> Option<&MarkupRecordStore> {
        self.markup.as_ref()
    }

    pub fn settings(&self) -> &JoinSettings {
        &self.settings
    }

    /// Flat record stream; every call starts over from the first item
    pub fn iter(&self) -> JoinedRecords<'_> {
        JoinedRecords {
            engine: self,
            group: 0,
            next_page: None,
        }
    }

    /// Resolve every page pointer against the tabular export
    ///
    /// Without a tabular export there is nothing to resolve against.
    ///
    /// # Errors
    ///
    /// `RecordNotFound` for the first pointer with no matching row.
    pub fn validate_page_pointers(&self) -> Result<()> {
        let Some(tabular) = &self.tabular else {
            return Ok(());
        };
        for page in self.records.iter().flat_map(FullRecord::item_level) {
            tabular.get_record(page_pointer(page)?)?;
        }
        Ok(())
    }

    /// Merged record for page `index` of `parent`, `None` past the last page
    fn merge_page(
        &self,
        parent: &FullRecord,
        index: usize,
        group_id: usize,
    ) -> Result<Option<Record>> {
        let separator = self.settings.separator.as_str();
        let Some(flat) = parent.flatten_page(index, separator) else {
            return Ok(None);
        };
        let mut merged: BTreeMap<String, FieldValue> = BTreeMap::new();

        // Lowest precedence first; later inserts win
        if let Some(tabular) = &self.tabular {
            let row = tabular.get_record(page_pointer(&parent.item_level()[index])?)?;
            for (name, value) in row.iter() {
                merged.insert(name.to_string(), FieldValue::Single(value.to_string()));
            }
        }
        for (name, value) in parent.object_level().data() {
            merged.insert(name.clone(), value.clone());
        }
        for (name, value) in flat {
            merged.insert(name, FieldValue::Single(value));
        }

        Ok(Some(
            Record::with_separator(merged, Vec::new(), separator).with_group_id(group_id),
        ))
    }
}

impl<'a> IntoIterator for &'a MetadataJoinEngine {
    type Item = Result<Record>;
    type IntoIter = JoinedRecords<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy flattened stream produced by [`MetadataJoinEngine::iter`]
///
/// Yields each item's object-level record, then one merged record per page.
/// A page whose pointer has no tabular row yields `Err(RecordNotFound)` and
/// the stream continues with the next record.
#[derive(Debug, Clone)]
pub struct JoinedRecords<'a> {
    engine: &'a MetadataJoinEngine,
    group: usize,
    // None until the current item's object-level record has been yielded
    next_page: Option<usize>,
}

impl<'a> Iterator for JoinedRecords<'a> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let full = self.engine.records.get(self.group)?;
            match self.next_page {
                None => {
                    self.next_page = Some(0);
                    let record = full.object_level().clone().with_group_id(self.group);
                    return Some(Ok(record));
                }
                Some(index) => match self.engine.merge_page(full, index, self.group) {
                    Ok(Some(record)) => {
                        self.next_page = Some(index + 1);
                        return Some(Ok(record));
                    }
                    Ok(None) => {
                        self.group += 1;
                        self.next_page = None;
                    }
                    Err(e) => {
                        self.next_page = Some(index + 1);
                        return Some(Err(e));
                    }
                },
            }
        }
    }
}

/// Split paths into at most one tabular and one markup export
fn classify_inputs<P: AsRef<Path>>(files: &[P]) -> Result<(Option<PathBuf>, Option<PathBuf>)> {
    if files.len() > 2 {
        return Err(MetadataError::TooManyInputs(format!(
            "expected at most 2 files, got {}",
            files.len()
        )));
    }

    let mut tabular = None;
    let mut markup = None;
    for file in files {
        let path = file.as_ref();
        let slot = match FileKind::from_path(path) {
            FileKind::Tabular => &mut tabular,
            FileKind::Markup => &mut markup,
            FileKind::Unsupported => {
                return Err(MetadataError::UnsupportedFileType(path.to_path_buf()))
            }
        };
        if slot.is_some() {
            return Err(MetadataError::TooManyInputs(format!(
                "more than one {} file",
                FileKind::from_path(path)
            )));
        }
        *slot = Some(path.to_path_buf());
    }

    if tabular.is_none() && markup.is_none() {
        return Err(MetadataError::MissingInputs);
    }
    Ok((tabular, markup))
}

fn join_both(
    tabular: &TabularRecordStore,
    markup: &MarkupRecordStore,
    separator: &str,
) -> Result<Vec<FullRecord>> {
    let markup_parts = markup.parts().count();
    let tabular_records = tabular.len();
    debug!(markup_parts, tabular_records, "Reconciling export record counts");
    if markup_parts != tabular_records {
        return Err(MetadataError::RecordMismatch {
            markup_parts,
            tabular_records,
        });
    }

    markup
        .iter()
        .map(|item| {
            let id = item
                .id()
                .ok_or_else(|| MetadataError::MissingIdentifier(MARKUP_ID_FIELD.to_string()))?;
            let row = tabular.get_record(id)?;
            let pages = item.pages().iter().map(|p| p.as_map().clone()).collect();
            Ok(FullRecord::new(tabular_view(row, separator), pages))
        })
        .collect()
}

fn tabular_view(row: &TabularRecord, separator: &str) -> Record {
    let record = Record::from(row);
    Record::with_separator(record.data().clone(), Vec::new(), separator)
}

/// A blank pointer never matches, even against a row with a blank identifier
fn page_pointer(page: &FieldMap) -> Result<&str> {
    page.get(PAGE_POINTER_FIELD)
        .and_then(|values| values.first())
        .map(String::as_str)
        .filter(|pointer| !pointer.is_empty())
        .ok_or_else(|| MetadataError::RecordNotFound(String::new()))
}
