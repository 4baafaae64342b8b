use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading, flattening or writing locale documents
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document is not a JSON object tree of stringifiable leaves
    #[error("Malformed document: {0}")]
    MalformedDocument(String),
    /// Two key-paths disagree on whether a segment is a leaf or a container
    #[error("Conflicting key path '{0}': used both as a value and as a group")]
    ConflictingPath(String),
    /// The language code could not be resolved to a display name
    #[error("Unrecognized language code '{0}'")]
    UnrecognizedLanguageCode(String),
    /// Reading or writing a document failed
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DocumentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DocumentError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;
