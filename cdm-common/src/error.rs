//! Common error types for the migration tools

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for migration tool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the migration tool crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested file does not exist
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Invalid caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
