//! Error types for document conversion.
//!
//! Only input problems are errors. Broken references and unusable style
//! values degrade the output instead (see `render` and `style`).

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a document for conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The document file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not a design document.
    #[error("{} is not a valid design document: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// In-memory JSON is not a design document.
    #[error("invalid design document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for conversion entry points.
pub type ConvertResult<T> = Result<T, ConvertError>;
