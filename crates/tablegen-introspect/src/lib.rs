//! Static introspection of table declaration files.
//!
//! Discovers declaration files, extracts annotation blocks into a registry,
//! resolves each table's key schema from its struct declaration, and probes
//! its impl blocks for optional capabilities. Nothing here executes the
//! target program.

pub mod annotations;
pub mod discover;
pub mod error;
pub mod options;
pub mod probe;
pub mod resolver;
pub mod source;

use std::path::Path;

use tablegen_core::{GenerationContext, ResolvedTable};
use tracing::info;

pub use annotations::{extract_annotations, extract_into};
pub use discover::discover;
pub use error::{IntrospectError, Result};
pub use options::IntrospectOptions;
pub use probe::probe_capabilities;
pub use resolver::{resolve_keys, ResolvedKey};
pub use source::{SourceFile, SourceSet, StructLookup};

/// Outcome of a full introspection pass.
#[derive(Debug, Clone)]
pub struct Introspection {
    pub context: GenerationContext,
    /// Resolved tables in emission order. Empty when the context is fatal.
    pub tables: Vec<ResolvedTable>,
}

/// Discover, extract, resolve and probe every table declared under `dir`.
///
/// Fatal-immediate conditions are returned as errors. Deferred key errors
/// are recorded in the returned context, in which case no table is probed.
pub fn introspect(dir: &Path, options: &IntrospectOptions) -> Result<Introspection> {
    let mut context = GenerationContext::new();

    let paths = discover(dir, &options.prefix)?;
    info!(event = "sources_discovered", dir = %dir.display(), files = paths.len());

    let sources = SourceSet::load(&paths, &mut context);
    for file in sources.files() {
        extract_into(&file.text, &file.path, &mut context);
    }
    info!(event = "registry_built", tables = context.registry.len());

    let keys = resolve_keys(&mut context, &sources, options)?;
    if context.is_fatal() {
        info!(
            event = "introspection_refused",
            errors = context.diagnostics.errors().count(),
            diagnostics = context.diagnostics.len()
        );
        return Ok(Introspection {
            context,
            tables: Vec::new(),
        });
    }

    let mut tables = Vec::with_capacity(keys.len());
    for resolved in keys {
        let capabilities = probe_capabilities(&sources, &resolved.entry.name, &mut context);
        tables.push(ResolvedTable {
            storage_var: resolved.entry.storage_var_name(),
            entry: resolved.entry,
            key: resolved.key,
            capabilities,
        });
    }
    info!(
        event = "introspection_finished",
        tables = tables.len(),
        diagnostics = context.diagnostics.len()
    );

    Ok(Introspection { context, tables })
}
