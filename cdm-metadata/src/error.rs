//! Error types for cdm-metadata
//!
//! Every failure is returned to the immediate caller. Nothing here is
//! retried or recovered; a malformed export is fatal for the store or
//! engine being built from it.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for metadata operations
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Metadata loading and join errors
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Export file does not exist
    #[error("File not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Extension is neither `.tsv` nor `.xml`
    #[error("Unsupported file type: {}", .0.display())]
    UnsupportedFileType(PathBuf),

    /// More than one export of a kind, or more than two exports total
    #[error("Too many inputs: {0}")]
    TooManyInputs(String),

    /// No usable export was supplied
    #[error("No valid input files supplied")]
    MissingInputs,

    /// Identifier lookup found no record
    ///
    /// Holds the identifier that was looked up. A page with a blank or
    /// absent pointer reports an empty identifier.
    #[error("No record for \"{0}\" was found in the metadata")]
    RecordNotFound(String),

    /// Markup item lacks the element holding its identifier
    #[error("Markup item has no <{0}> identifier to join on")]
    MissingIdentifier(String),

    /// Requested field is not part of the store's field set
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// Tabular row count disagrees with the markup item + page count
    #[error(
        "Record mismatch: markup export describes {markup_parts} items and pages, \
         tabular export has {tabular_records} rows"
    )]
    RecordMismatch {
        markup_parts: usize,
        tabular_records: usize,
    },

    /// Field listing requested from a tabular export with no rows
    #[error("Tabular export contains no records")]
    NoRecords,

    /// Tabular export could not be parsed
    #[error("Tabular parse error: {0}")]
    Tabular(#[from] csv::Error),

    /// Markup export could not be parsed
    #[error("Markup parse error: {0}")]
    Markup(#[from] quick_xml::Error),

    /// Markup export is well-formed token-wise but has no usable tree
    #[error("Malformed markup: {0}")]
    MalformedMarkup(String),

    /// Record serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error (file read, output write)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// cdm-common error (temporary copies, configuration)
    #[error("Common error: {0}")]
    Common(#[from] cdm_common::Error),
}
