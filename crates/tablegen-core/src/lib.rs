//! Core contracts and helpers for tablegen.
//!
//! This crate defines the table model shared by the introspection passes,
//! the emitter, and the CLI: table entries, key schemas, capability
//! descriptors, and the per-run generation context.

pub mod capability;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod naming;
pub mod table;

pub use capability::{CapabilityDescriptor, Pattern, SecondaryIndex, Variant, AFTER_LOAD_METHOD};
pub use context::{GenerationContext, Registry};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{Error, Result};
pub use table::{KeyField, KeyKind, KeyRepr, KeySchema, ResolvedTable, TableEntry};

/// Name of the generator stamped into artifact headers.
pub const GENERATOR_NAME: &str = "tablegen";
