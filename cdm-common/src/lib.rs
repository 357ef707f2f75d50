//! # CDM Common Library
//!
//! Shared code for the CONTENTdm migration tools including:
//! - Error types
//! - Configuration loading
//! - Scoped temporary copies of export files
//! - Locating export files in a directory tree

pub mod config;
pub mod error;
pub mod finder;
pub mod temp_copy;

pub use error::{Error, Result};
pub use finder::{find_file_locally, find_files_matching};
pub use temp_copy::TempCopy;
