use std::collections::BTreeSet;

use syn::punctuated::Punctuated;
use syn::{Block, Expr, ExprLit, Lit, Stmt, Token};
use tablegen_core::naming::is_identifier;
use tablegen_core::{
    CapabilityDescriptor, Diagnostic, GenerationContext, Pattern, SecondaryIndex,
    AFTER_LOAD_METHOD,
};
use tracing::{debug, warn};

use crate::source::SourceSet;

/// Determine which optional generation patterns `table` opts into, purely
/// from the names of the functions declared in its impl blocks.
pub fn probe_capabilities(
    sources: &SourceSet,
    table: &str,
    context: &mut GenerationContext,
) -> CapabilityDescriptor {
    let functions = sources.impl_fns(table);
    let names: BTreeSet<String> = functions
        .iter()
        .map(|function| function.sig.ident.to_string())
        .collect();

    let mut capabilities = CapabilityDescriptor {
        has_after_load: names.contains(AFTER_LOAD_METHOD),
        ..CapabilityDescriptor::default()
    };

    for pattern in Pattern::ALL {
        if !names.contains(pattern.probe_method()) {
            continue;
        }
        let has_sort = names.contains(pattern.sort_method());

        let names_fn = functions
            .iter()
            .find(|function| function.sig.ident == pattern.names_method());
        let index = match names_fn.map(|function| literal_names(&function.block)) {
            None => SecondaryIndex::default_for(table, pattern, has_sort),
            Some(Some(custom)) => SecondaryIndex::custom(pattern, custom, has_sort),
            Some(None) => {
                warn!(event = "custom_names_fallback", table, method = pattern.names_method());
                context.report(Diagnostic::warning(
                    "custom_names_fallback",
                    table,
                    format!(
                        "{} must return a literal list of identifiers; using the default variant",
                        pattern.names_method()
                    ),
                ));
                SecondaryIndex::default_for(table, pattern, has_sort)
            }
        };
        capabilities.set_index(index);
    }

    debug!(
        event = "capabilities_probed",
        table,
        key_slice = capabilities.key_slice.is_some(),
        value_slice = capabilities.value_slice.is_some(),
        after_load = capabilities.has_after_load
    );
    capabilities
}

/// Names from a body that is a single return of a literal string sequence.
/// Returns `None` for anything else, including an empty sequence.
fn literal_names(block: &Block) -> Option<Vec<String>> {
    let [Stmt::Expr(expr, _)] = block.stmts.as_slice() else {
        return None;
    };
    let names = sequence_literals(expr)?;
    if names.is_empty() || !names.iter().all(|name| is_identifier(name)) {
        return None;
    }
    Some(names)
}

fn sequence_literals(expr: &Expr) -> Option<Vec<String>> {
    match expr {
        Expr::Return(ret) => sequence_literals(ret.expr.as_deref()?),
        Expr::Array(array) => string_literals(array.elems.iter()),
        Expr::Reference(reference) => sequence_literals(&reference.expr),
        Expr::Paren(paren) => sequence_literals(&paren.expr),
        Expr::Group(group) => sequence_literals(&group.expr),
        Expr::MethodCall(call) if call.args.is_empty() && call.method == "to_vec" => {
            sequence_literals(&call.receiver)
        }
        Expr::Macro(mac) if mac.mac.path.is_ident("vec") => {
            let elems = mac
                .mac
                .parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated)
                .ok()?;
            string_literals(elems.iter())
        }
        _ => None,
    }
}

fn string_literals<'a>(elems: impl Iterator<Item = &'a Expr>) -> Option<Vec<String>> {
    elems
        .map(|elem| match elem {
            Expr::Lit(ExprLit {
                lit: Lit::Str(value),
                ..
            }) => Some(value.value()),
            _ => None,
        })
        .collect()
}
