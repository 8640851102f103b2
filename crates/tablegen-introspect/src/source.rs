use std::fs;
use std::path::{Path, PathBuf};

use syn::{ImplItem, ImplItemFn, Item, ItemStruct, Type};
use tablegen_core::{Diagnostic, GenerationContext};
use tracing::warn;

/// A declaration file read from disk.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
    /// Parsed items, `None` when the file failed to parse.
    pub parsed: Option<syn::File>,
}

/// Where a struct declaration was (or was not) found.
#[derive(Debug)]
pub enum StructLookup<'a> {
    Found { item: &'a ItemStruct, path: &'a Path },
    /// Not among the parsed files, but an unparsed file appears to declare it.
    InUnparsed { path: &'a Path },
    Missing,
}

/// Declaration files of one run, each read and parsed once.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    files: Vec<SourceFile>,
}

impl SourceSet {
    /// Read and parse `paths`. Unreadable files are skipped; unparseable
    /// files are kept as raw text. Both are reported as warnings.
    pub fn load(paths: &[PathBuf], context: &mut GenerationContext) -> Self {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let text = match fs::read_to_string(path) {
                Ok(text) => text,
                Err(err) => {
                    warn!(event = "source_unreadable", path = %path.display(), error = %err);
                    context.report(Diagnostic::warning(
                        "unreadable_source",
                        path.display().to_string(),
                        err.to_string(),
                    ));
                    continue;
                }
            };
            files.push(SourceFile::parse(path.clone(), text, context));
        }
        Self { files }
    }

    pub fn from_files(files: Vec<SourceFile>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Locate the top-level struct declaration named `name`.
    pub fn find_struct(&self, name: &str) -> StructLookup<'_> {
        for file in &self.files {
            let Some(parsed) = &file.parsed else {
                continue;
            };
            for item in &parsed.items {
                if let Item::Struct(item_struct) = item {
                    if item_struct.ident == name {
                        return StructLookup::Found {
                            item: item_struct,
                            path: &file.path,
                        };
                    }
                }
            }
        }

        let needle = format!("struct {name}");
        self.files
            .iter()
            .filter(|file| file.parsed.is_none())
            .find(|file| declares(&file.text, &needle))
            .map_or(StructLookup::Missing, |file| StructLookup::InUnparsed {
                path: &file.path,
            })
    }

    /// Functions declared in top-level impl blocks for `name`, `&name` or
    /// `&mut name`, inherent and trait impls alike, in file order.
    pub fn impl_fns(&self, name: &str) -> Vec<&ImplItemFn> {
        let mut fns = Vec::new();
        for parsed in self.files.iter().filter_map(|file| file.parsed.as_ref()) {
            for item in &parsed.items {
                let Item::Impl(item_impl) = item else {
                    continue;
                };
                if !self_type_is(&item_impl.self_ty, name) {
                    continue;
                }
                for impl_item in &item_impl.items {
                    if let ImplItem::Fn(function) = impl_item {
                        fns.push(function);
                    }
                }
            }
        }
        fns
    }
}

impl SourceFile {
    fn parse(path: PathBuf, text: String, context: &mut GenerationContext) -> Self {
        let parsed = match syn::parse_file(&text) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                let line = err.span().start().line;
                warn!(event = "source_unparseable", path = %path.display(), line, error = %err);
                context.report(Diagnostic::warning(
                    "unparseable_source",
                    path.display().to_string(),
                    format!("line {line}: {err}"),
                ));
                None
            }
        };
        Self { path, text, parsed }
    }
}

fn self_type_is(ty: &Type, name: &str) -> bool {
    match ty {
        Type::Path(type_path) => {
            type_path.qself.is_none()
                && type_path
                    .path
                    .segments
                    .last()
                    .is_some_and(|segment| segment.ident == name)
        }
        Type::Reference(reference) => self_type_is(&reference.elem, name),
        Type::Paren(paren) => self_type_is(&paren.elem, name),
        Type::Group(group) => self_type_is(&group.elem, name),
        _ => false,
    }
}

/// Whole-word search for `struct Name` in raw text.
fn declares(text: &str, needle: &str) -> bool {
    text.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'));
        let after_ok = text[end..]
            .chars()
            .next()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'));
        before_ok && after_ok
    })
}
