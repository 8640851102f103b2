//! Code emission for tablegen.
//!
//! This crate turns resolved tables into the two generated module files:
//! the primary artifact (storage, loaders, accessors) and the secondary
//! artifact (secondary indexes and post-load hooks). Fragments are collected
//! into named sections first and each artifact is rendered once.

pub mod emitter;
pub mod errors;
pub mod ir;
pub mod keys;
pub mod model;
pub mod primary;
pub mod secondary;

pub use emitter::Emitter;
pub use errors::EmitError;
pub use ir::{Artifact, Section, SectionKind};
pub use model::{EmitOptions, RenderedArtifacts};
