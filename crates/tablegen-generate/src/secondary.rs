//! Secondary artifact: secondary indexes and post-load hooks.

use std::fmt::Write;

use tablegen_core::naming::fn_suffix;
use tablegen_core::{Pattern, ResolvedTable};

use crate::errors::EmitError;
use crate::ir::{Artifact, SectionKind};
use crate::model::EmitOptions;

/// Empty secondary artifact with its imports.
pub fn artifact(options: &EmitOptions) -> Artifact {
    let mut artifact = Artifact::new("Secondary indexes and post-load hooks.");
    artifact.import("use std::sync::{Arc, LazyLock, PoisonError, RwLock};");
    artifact.import("");
    artifact.import(format!("use {}::tools::{{Key2, Key3}};", options.base));
    artifact.import("");
    artifact.import(format!("use super::{}::*;", options.primary_module));
    artifact.import("use super::*;");
    artifact
}

/// One holder built by `after_load_<table>`.
struct Holder {
    pattern: Pattern,
    /// Position of the variant within its pattern, passed to the row probe.
    position: usize,
    local: String,
    ty: String,
    storage: String,
    sorted: bool,
}

/// Add every secondary fragment of `table`.
pub fn contribute(artifact: &mut Artifact, table: &ResolvedTable) -> Result<(), EmitError> {
    let name = table.name();
    let holders = holders(table);

    for holder in &holders {
        let element = match holder.pattern {
            Pattern::KeySlice => table.key.map_key_type().to_string(),
            Pattern::ValueSlice => format!("Arc<{name}>"),
        };
        artifact.push(
            SectionKind::SliceTypes,
            format!("pub type {} = Vec<{element}>;", holder.ty),
        );
        artifact.push(
            SectionKind::SliceStorage,
            format!(
                "pub(super) static {}: LazyLock<RwLock<Arc<{}>>> =\n    LazyLock::new(|| RwLock::new(Arc::default()));",
                holder.storage, holder.ty
            ),
        );
    }

    artifact.push(SectionKind::AfterLoad, after_load(table, &holders)?);
    Ok(())
}

fn holders(table: &ResolvedTable) -> Vec<Holder> {
    table
        .capabilities
        .indexes()
        .flat_map(|index| {
            index
                .variants
                .iter()
                .enumerate()
                .map(move |(position, variant)| (index, position, variant))
        })
        .enumerate()
        .map(|(ordinal, (index, position, variant))| Holder {
            pattern: index.pattern,
            position,
            local: format!("slice_{}", ordinal + 1),
            ty: variant.holder_type(index.pattern),
            storage: variant.storage_var(index.pattern),
            sorted: index.has_sort,
        })
        .collect()
}

fn after_load(table: &ResolvedTable, holders: &[Holder]) -> Result<String, EmitError> {
    let name = table.name();
    let suffix = fn_suffix(name);
    let has_after_load = table.capabilities.has_after_load;

    let mut out = String::new();
    if holders.is_empty() {
        writeln!(out, "/// Runs the post-load hook of `{name}`.")?;
        writeln!(out, "pub fn after_load_{suffix}() {{")?;
        if has_after_load {
            writeln!(out, "    {name}::after_load(&get_all_{suffix}());")?;
        }
        writeln!(out, "}}")?;
        return Ok(out);
    }

    writeln!(out, "/// Rebuilds the secondary indexes of `{name}`.")?;
    writeln!(out, "pub fn after_load_{suffix}() {{")?;
    writeln!(out, "    let table = get_all_{suffix}();")?;
    for holder in holders {
        writeln!(
            out,
            "    let mut {} = {}::with_capacity(table.len());",
            holder.local, holder.ty
        )?;
    }

    let wants_key = holders
        .iter()
        .any(|holder| holder.pattern == Pattern::KeySlice);
    if wants_key {
        writeln!(out, "    for (key, row) in table.iter() {{")?;
    } else {
        writeln!(out, "    for row in table.values() {{")?;
    }
    for holder in holders {
        let (probe, value) = match holder.pattern {
            Pattern::KeySlice => ("key_slice", "key.clone()"),
            Pattern::ValueSlice => ("value_slice", "Arc::clone(row)"),
        };
        writeln!(out, "        if row.{probe}({}) {{", holder.position)?;
        writeln!(out, "            {}.push({value});", holder.local)?;
        writeln!(out, "        }}")?;
    }
    writeln!(out, "    }}")?;

    for holder in holders.iter().filter(|holder| holder.sorted) {
        writeln!(
            out,
            "    {name}::{}(&mut {}, {});",
            holder.pattern.sort_method(),
            holder.local,
            holder.position
        )?;
    }
    for holder in holders {
        writeln!(
            out,
            "    *{}.write().unwrap_or_else(PoisonError::into_inner) = Arc::new({});",
            holder.storage, holder.local
        )?;
    }
    if has_after_load {
        writeln!(out, "    {name}::after_load(&table);")?;
    }
    writeln!(out, "}}")?;
    Ok(out)
}
