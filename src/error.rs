//! Error types for the cache library
//!
//! Provides unified error handling using thiserror.
//!
//! Only the snapshot codec and its file wrappers can fail. Lookups that miss
//! are reported through `Option`/`bool`, never through this type.

use std::io;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for snapshot persistence.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Underlying I/O failure (open, read, write, flush)
    #[error("Persistence error: {0}")]
    Persistence(#[from] io::Error),

    /// Malformed or truncated snapshot stream
    #[error("Format error: {0}")]
    Format(String),
}

impl CacheError {
    // == Is Persistence ==
    /// Returns true if the error came from the storage layer.
    pub fn is_persistence(&self) -> bool {
        matches!(self, CacheError::Persistence(_))
    }

    // == Is Format ==
    /// Returns true if the snapshot data itself was corrupt.
    pub fn is_format(&self) -> bool {
        matches!(self, CacheError::Format(_))
    }
}

// == From bincode ==
/// Splits bincode failures into disk problems and corrupt data.
///
/// A stream that ends early is corrupt data, not a storage failure, so
/// `UnexpectedEof` is reported as [`CacheError::Format`].
impl From<bincode::Error> for CacheError {
    fn from(err: bincode::Error) -> Self {
        match *err {
            bincode::ErrorKind::Io(io_err) if io_err.kind() == io::ErrorKind::UnexpectedEof => {
                CacheError::Format(format!("truncated snapshot: {}", io_err))
            }
            bincode::ErrorKind::Io(io_err) => CacheError::Persistence(io_err),
            other => CacheError::Format(other.to_string()),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for snapshot operations.
pub type Result<T> = std::result::Result<T, CacheError>;
