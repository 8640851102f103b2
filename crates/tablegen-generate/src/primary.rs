//! Primary artifact: storage, loaders and key accessors.

use std::fmt::Write;

use tablegen_core::naming::fn_suffix;
use tablegen_core::ResolvedTable;

use crate::errors::EmitError;
use crate::ir::{Artifact, SectionKind};
use crate::keys;
use crate::model::EmitOptions;

/// Empty primary artifact with its imports.
pub fn artifact(options: &EmitOptions) -> Artifact {
    let mut artifact = Artifact::new("Table storage, loaders and accessors.");
    artifact.import("use std::collections::HashMap;");
    artifact.import("use std::sync::{Arc, LazyLock, PoisonError, RwLock};");
    artifact.import("");
    artifact.import(format!(
        "use {}::tools::{{load_rows, Key2, Key3, TableError}};",
        options.base
    ));
    artifact.import("");
    artifact.import(format!("use super::{}::*;", options.secondary_module));
    artifact.import("use super::*;");
    artifact
}

/// Add every primary fragment of `table`.
pub fn contribute(artifact: &mut Artifact, table: &ResolvedTable) -> Result<(), EmitError> {
    let name = table.name();
    let key_type = table.key.map_key_type();

    artifact.push(
        SectionKind::MapTypes,
        format!("pub type {name}Table = HashMap<{key_type}, Arc<{name}>>;"),
    );
    artifact.push(
        SectionKind::Storage,
        format!(
            "pub(super) static {}: LazyLock<RwLock<Arc<{name}Table>>> =\n    LazyLock::new(|| RwLock::new(Arc::default()));",
            table.storage_var
        ),
    );
    artifact.push(SectionKind::Loaders, loader(table)?);
    if table.key.is_explicit() {
        artifact.push(SectionKind::GetKey, get_key(table)?);
    }
    artifact.push(SectionKind::Accessors, accessor(table)?);
    artifact.push(SectionKind::GetAll, snapshots(table)?);
    Ok(())
}

/// `load_all()` calling every loader in the given order.
pub fn load_all(artifact: &mut Artifact, tables: &[&ResolvedTable]) -> Result<(), EmitError> {
    let mut out = String::new();
    writeln!(out, "/// Loads every table.")?;
    writeln!(out, "pub fn load_all() -> Result<(), TableError> {{")?;
    for table in tables {
        if !table.entry.depend.is_empty() {
            writeln!(out, "    // {} depends on: {}", table.name(), table.entry.depend.join(", "))?;
        }
        writeln!(out, "    load_{}()?;", fn_suffix(table.name()))?;
    }
    writeln!(out, "    Ok(())")?;
    writeln!(out, "}}")?;
    artifact.push(SectionKind::LoadAll, out);
    Ok(())
}

fn loader(table: &ResolvedTable) -> Result<String, EmitError> {
    let name = table.name();
    let suffix = fn_suffix(name);
    let mut out = String::new();
    writeln!(out, "/// Loads `{name}` rows and publishes them.")?;
    writeln!(out, "pub fn load_{suffix}() -> Result<(), TableError> {{")?;
    writeln!(
        out,
        "    let rows: Vec<{name}> = load_rows({:?}, {:?})?;",
        table.entry.excel, table.entry.csv
    )?;
    writeln!(out, "    let mut table = {name}Table::with_capacity(rows.len());")?;
    writeln!(out, "    for row in rows {{")?;
    writeln!(
        out,
        "        table.insert({}, Arc::new(row));",
        keys::row_key(&table.key)
    )?;
    writeln!(out, "    }}")?;
    writeln!(
        out,
        "    *{}.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(table);",
        table.storage_var
    )?;
    writeln!(out, "    after_load_{suffix}();")?;
    writeln!(out, "    Ok(())")?;
    writeln!(out, "}}")?;
    Ok(out)
}

fn get_key(table: &ResolvedTable) -> Result<String, EmitError> {
    let mut out = String::new();
    writeln!(out, "impl {} {{", table.name())?;
    writeln!(out, "    pub fn get_key(&self) -> {} {{", table.key.map_key_type())?;
    writeln!(out, "        {}", keys::get_key_body(&table.key))?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;
    Ok(out)
}

fn accessor(table: &ResolvedTable) -> Result<String, EmitError> {
    let name = table.name();
    let (binding, lookup) = keys::accessor_lookup(&table.key);
    let mut out = String::new();
    writeln!(
        out,
        "pub fn get_{}({}) -> Option<Arc<{name}>> {{",
        fn_suffix(name),
        keys::accessor_params(&table.key)
    )?;
    if let Some(binding) = binding {
        writeln!(out, "    {binding}")?;
    }
    writeln!(
        out,
        "    {}.read().unwrap_or_else(PoisonError::into_inner).get({lookup}).cloned()",
        table.storage_var
    )?;
    writeln!(out, "}}")?;
    Ok(out)
}

fn snapshots(table: &ResolvedTable) -> Result<String, EmitError> {
    let name = table.name();
    let mut out = String::new();
    snapshot_fn(
        &mut out,
        &format!("get_all_{}", fn_suffix(name)),
        &format!("{name}Table"),
        &table.storage_var,
    )?;
    for index in table.capabilities.indexes() {
        for variant in &index.variants {
            writeln!(out)?;
            snapshot_fn(
                &mut out,
                &variant.accessor_name(index.pattern),
                &variant.holder_type(index.pattern),
                &variant.storage_var(index.pattern),
            )?;
        }
    }
    Ok(out)
}

fn snapshot_fn(out: &mut String, fn_name: &str, ty: &str, storage: &str) -> std::fmt::Result {
    writeln!(out, "pub fn {fn_name}() -> Arc<{ty}> {{")?;
    writeln!(
        out,
        "    Arc::clone(&{storage}.read().unwrap_or_else(PoisonError::into_inner))"
    )?;
    writeln!(out, "}}")
}
