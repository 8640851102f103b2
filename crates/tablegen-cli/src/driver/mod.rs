mod atomic;
mod build;
mod format;
mod lock;
mod logging;
mod rotate;

pub use build::{inspect, Driver};
pub use format::formatter_for;
pub use logging::init_logging;

use std::path::PathBuf;

use tablegen_generate::EmitError;
use tablegen_introspect::IntrospectError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised by the build driver.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("introspection error: {0}")]
    Introspect(#[from] IntrospectError),
    #[error("emit error: {0}")]
    Emit(#[from] EmitError),
    #[error("failed to run formatter '{program}': {source}")]
    FormatterSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("formatter '{program}' failed on {path} ({status})")]
    FormatterFailed {
        program: String,
        path: PathBuf,
        status: String,
    },
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("logging error: {0}")]
    Logging(String),
}

pub type DriverResult<T> = std::result::Result<T, DriverError>;
