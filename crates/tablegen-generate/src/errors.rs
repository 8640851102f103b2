use thiserror::Error;

/// Errors emitted by the code emitter.
#[derive(Debug, Error)]
pub enum EmitError {
    /// Resolution recorded errors; nothing is emitted.
    #[error("emission aborted: {errors} unresolved table error(s)")]
    Aborted { errors: usize },
    #[error("format error: {0}")]
    Fmt(#[from] std::fmt::Error),
}
