use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort introspection immediately.
#[derive(Debug, Error)]
pub enum IntrospectError {
    #[error("cannot read declaration directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// No declaration file declares the annotated type.
    #[error("struct '{0}' not found in any declaration file")]
    TypeNotFound(String),
    /// The annotated type is declared without fields.
    #[error("struct '{name}' in {path} has no fields")]
    EmptyType { name: String, path: PathBuf },
}

/// Result type for introspection operations.
pub type Result<T> = std::result::Result<T, IntrospectError>;
