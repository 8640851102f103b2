use std::collections::BTreeMap;

use syn::{Attribute, Expr, ExprLit, Field, Lit, Meta, Type};
use tablegen_core::naming::fn_suffix;
use tablegen_core::{Diagnostic, GenerationContext, KeyField, KeySchema, TableEntry};
use tracing::{debug, error};

use crate::error::{IntrospectError, Result};
use crate::options::IntrospectOptions;
use crate::source::{SourceSet, StructLookup};

/// Field name used as the key when no field is tagged.
pub const IMPLICIT_KEY_FIELD: &str = "id";

/// A registry entry together with its key schema.
#[derive(Debug, Clone)]
pub struct ResolvedKey {
    pub entry: TableEntry,
    pub key: KeySchema,
}

/// Resolve the key schema of every registered table, in emission order.
///
/// A missing or field-less struct aborts immediately. Key problems are
/// recorded as errors in `context` and resolution moves on, so that every
/// one of them is reported; callers must check `context.is_fatal()`.
pub fn resolve_keys(
    context: &mut GenerationContext,
    sources: &SourceSet,
    options: &IntrospectOptions,
) -> Result<Vec<ResolvedKey>> {
    let entries: Vec<TableEntry> = context.registry.sorted().into_iter().cloned().collect();

    let mut resolved = Vec::with_capacity(entries.len());
    let mut claimed = BTreeMap::new();
    for entry in entries {
        let (item, path) = match sources.find_struct(&entry.name) {
            StructLookup::Found { item, path } => (item, path),
            StructLookup::InUnparsed { path } => {
                report_key_error(
                    context,
                    "unparseable_source",
                    &entry.name,
                    format!("declaring file {} could not be parsed", path.display()),
                );
                continue;
            }
            StructLookup::Missing => {
                error!(event = "type_not_found", table = %entry.name);
                return Err(IntrospectError::TypeNotFound(entry.name));
            }
        };

        if item.fields.is_empty() {
            error!(event = "type_empty", table = %entry.name, path = %path.display());
            return Err(IntrospectError::EmptyType {
                name: entry.name,
                path: path.to_path_buf(),
            });
        }

        if let Some(key) = resolve_struct_key(context, &entry.name, item.fields.iter(), options) {
            if !claim_generated_names(context, &mut claimed, &entry) {
                continue;
            }
            debug!(
                event = "key_resolved",
                table = %entry.name,
                fields = key.fields().len(),
                explicit = key.is_explicit()
            );
            resolved.push(ResolvedKey { entry, key });
        }
    }

    Ok(resolved)
}

fn resolve_struct_key<'a>(
    context: &mut GenerationContext,
    table: &str,
    fields: impl Iterator<Item = &'a Field>,
    options: &IntrospectOptions,
) -> Option<KeySchema> {
    let mut implicit = None;
    let mut explicit = Vec::new();
    let mut failed = false;

    for field in fields {
        let Some(ident) = &field.ident else {
            continue;
        };
        let name = ident.to_string();

        if name.eq_ignore_ascii_case(IMPLICIT_KEY_FIELD) && implicit.is_none() {
            implicit = Some(field);
        }

        if has_key_tag(&field.attrs, &options.key_marker) {
            match key_field(&name, &field.ty) {
                Ok(key_field) => explicit.push(key_field),
                Err(err) => {
                    let line = ident.span().start().line;
                    report_key_error(
                        context,
                        "unsupported_key_kind",
                        table,
                        format!("line {line}: {err}"),
                    );
                    failed = true;
                }
            }
        }
    }

    if failed {
        return None;
    }
    if !explicit.is_empty() {
        return KeySchema::new(table, explicit, true).ok();
    }

    let Some(field) = implicit else {
        report_key_error(
            context,
            "missing_key",
            table,
            format!(
                "no field is tagged as key and there is no default key field '{IMPLICIT_KEY_FIELD}'"
            ),
        );
        return None;
    };

    let name = field.ident.as_ref().map(ToString::to_string).unwrap_or_default();
    match key_field(&name, &field.ty) {
        Ok(key_field) => KeySchema::new(table, vec![key_field], false).ok(),
        Err(err) => {
            report_key_error(context, "unsupported_key_kind", table, err.to_string());
            None
        }
    }
}

/// Record the names generated for `entry`, keyed by function suffix. Case
/// conversion can map distinct type names onto the same statics and
/// functions; the later table in name order is reported and skipped.
fn claim_generated_names(
    context: &mut GenerationContext,
    claimed: &mut BTreeMap<String, String>,
    entry: &TableEntry,
) -> bool {
    let suffix = fn_suffix(&entry.name);
    let Some(first) = claimed.get(&suffix) else {
        claimed.insert(suffix, entry.name.clone());
        return true;
    };

    let declared = context
        .registry
        .get(first)
        .and_then(|owner| owner.origin.as_ref())
        .map(|path| format!(" (declared in {})", path.display()))
        .unwrap_or_default();
    let message = format!(
        "generated names {} and load_{suffix} are already taken by '{first}'{declared}",
        entry.storage_var_name()
    );
    report_key_error(context, "name_collision", &entry.name, message);
    false
}

fn report_key_error(context: &mut GenerationContext, code: &str, table: &str, message: String) {
    error!(event = "key_unresolved", code, table, message = %message);
    context.report(Diagnostic::error(code, table, message));
}

fn key_field(name: &str, ty: &Type) -> tablegen_core::Result<KeyField> {
    KeyField::new(name, type_name(ty))
}

/// True when the field carries the marker attribute with an argument whose
/// text contains `key`, e.g. `#[table(key)]` or `#[table = "key,skip"]`.
pub fn has_key_tag(attrs: &[Attribute], marker: &str) -> bool {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident(marker))
        .any(|attr| match &attr.meta {
            Meta::List(list) => list_mentions_key(&list.tokens.to_string()),
            Meta::NameValue(name_value) => match &name_value.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(value),
                    ..
                }) => list_mentions_key(&value.value()),
                _ => false,
            },
            Meta::Path(_) => false,
        })
}

fn list_mentions_key(list: &str) -> bool {
    list.split(',').any(|item| item.trim().contains("key"))
}

/// Short textual form of a declared type: the last path segment for paths.
fn type_name(ty: &Type) -> String {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
            .unwrap_or_default(),
        Type::Reference(reference) => format!("&{}", type_name(&reference.elem)),
        Type::Paren(paren) => type_name(&paren.elem),
        Type::Group(group) => type_name(&group.elem),
        Type::Array(array) => format!("[{}; _]", type_name(&array.elem)),
        Type::Slice(slice) => format!("[{}]", type_name(&slice.elem)),
        Type::Tuple(tuple) => format!("({} elements)", tuple.elems.len()),
        _ => "<unsupported>".to_string(),
    }
}
