use thiserror::Error;

/// Core error type shared across tablegen crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A key schema was requested with no fields.
    #[error("empty key schema for table '{0}'")]
    EmptyKeySchema(String),
    /// A key field uses a type the generated storage cannot index by.
    #[error("unsupported key type '{ty}' on field '{field}'")]
    UnsupportedKeyType { field: String, ty: String },
}

/// Convenience alias for results returned by tablegen crates.
pub type Result<T> = std::result::Result<T, Error>;
