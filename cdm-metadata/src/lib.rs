//! cdm-metadata library interface
//!
//! Reads the two export formats of a CONTENTdm collection (tab-separated
//! and XML), normalizes them into read-only records and joins them into a
//! single flat stream of item and page records.

pub mod cleanup;
pub mod error;
pub mod file_kind;
pub mod full_record;
pub mod inputs;
pub mod join;
pub mod output;
pub mod record;
pub mod stores;

pub use crate::error::{MetadataError, Result};
pub use crate::file_kind::FileKind;
pub use crate::full_record::FullRecord;
pub use crate::join::{JoinedRecords, MetadataJoinEngine};
pub use crate::record::{FieldMap, FieldValue, Record};
pub use crate::stores::{
    MarkupRecord, MarkupRecordStore, PageRecord, RecordSource, TabularRecord, TabularRecordStore,
};
pub use cdm_common::config::{JoinSettings, DEFAULT_SEPARATOR};
