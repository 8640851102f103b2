use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tablegen_core::naming::is_identifier;
use tablegen_core::{Diagnostic, GenerationContext, TableEntry};
use tracing::{debug, warn};

static BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*(.*?)\*/").expect("valid block regex"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([^\r\n]+)").expect("valid tag regex"));

/// Extract every annotated table declared in `text`.
///
/// Malformed tags and blocks without a usable type name are reported to
/// `context` and skipped.
pub fn extract_annotations(
    text: &str,
    origin: &Path,
    context: &mut GenerationContext,
) -> Vec<TableEntry> {
    BLOCK_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|block| parse_block(block.as_str(), origin, context))
        .collect()
}

/// Extract annotations from `text` and insert them into the registry.
/// Later blocks for the same type replace earlier ones.
pub fn extract_into(text: &str, origin: &Path, context: &mut GenerationContext) {
    for entry in extract_annotations(text, origin, context) {
        let name = entry.name.clone();
        if context.registry.insert(entry).is_some() {
            debug!(event = "table_redeclared", table = %name, path = %origin.display());
        }
    }
}

fn parse_block(block: &str, origin: &Path, context: &mut GenerationContext) -> Option<TableEntry> {
    let mut tags = TAG_RE
        .captures_iter(block)
        .filter_map(|caps| caps.get(1))
        .map(|tag| tag.as_str().trim());

    let name = tags.next()?.split_whitespace().next().unwrap_or_default();
    if !is_identifier(name) {
        warn!(event = "invalid_table_name", path = %origin.display(), name);
        context.report(Diagnostic::warning(
            "invalid_table_name",
            origin.display().to_string(),
            format!("annotation block names '{name}', which is not a type identifier"),
        ));
        return None;
    }

    let mut entry = TableEntry::new(name);
    entry.origin = Some(origin.to_path_buf());

    for tag in tags {
        let tokens: Vec<&str> = tag.split_whitespace().collect();
        let [key, value] = tokens.as_slice() else {
            warn!(event = "malformed_tag", table = %entry.name, tag);
            context.report(Diagnostic::warning(
                "malformed_tag",
                entry.name.clone(),
                format!("expected '@key value', found '@{tag}'"),
            ));
            continue;
        };

        match *key {
            "csv" => entry.csv = (*value).to_string(),
            "excel" => entry.excel = (*value).to_string(),
            "depend" => entry.depend.extend(
                value
                    .split('|')
                    .filter(|name| !name.is_empty())
                    .map(str::to_string),
            ),
            other => debug!(event = "tag_ignored", table = %entry.name, key = other),
        }
    }

    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> (Vec<TableEntry>, GenerationContext) {
        let mut context = GenerationContext::new();
        let entries = extract_annotations(text, Path::new("c_test.rs"), &mut context);
        (entries, context)
    }

    #[test]
    fn reads_name_paths_and_dependencies() {
        let text = r#"
/*
@Item
@csv data/item.csv
@excel data/item.xlsx
@depend Skill|Buff
@depend Drop
*/
pub struct Item { pub id: i32 }
"#;
        let (entries, context) = extract(text);
        assert!(context.diagnostics.is_empty());
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry.name, "Item");
        assert_eq!(entry.csv, "data/item.csv");
        assert_eq!(entry.excel, "data/item.xlsx");
        assert_eq!(entry.depend, vec!["Skill", "Buff", "Drop"]);
        assert_eq!(entry.origin.as_deref(), Some(Path::new("c_test.rs")));
    }

    #[test]
    fn doc_style_blocks_and_multiple_tables() {
        let text = "/**\n * @Item\n * @csv item.csv\n */\n/* @Skill */\n";
        let (entries, _) = extract(text);
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Item", "Skill"]);
        assert_eq!(entries[0].csv, "item.csv");
    }

    #[test]
    fn malformed_tags_are_skipped_with_a_warning() {
        let text = "/*\n@Item\n@csv\n@excel a b c\n@csv ok.csv\n@color blue\n*/";
        let (entries, context) = extract(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].csv, "ok.csv");
        assert!(entries[0].excel.is_empty());
        assert_eq!(context.diagnostics.warnings().count(), 2);
        assert!(!context.is_fatal());
    }

    #[test]
    fn blocks_without_tags_are_ignored() {
        let (entries, context) = extract("/* plain comment */ fn main() {}");
        assert!(entries.is_empty());
        assert!(context.diagnostics.is_empty());
    }

    #[test]
    fn non_identifier_names_are_rejected() {
        let (entries, context) = extract("/* mail me at someone@example.com */");
        assert!(entries.is_empty());
        assert_eq!(context.diagnostics.warnings().count(), 1);
    }

    #[test]
    fn last_block_wins_in_registry() {
        let mut context = GenerationContext::new();
        let text = "/*\n@Item\n@csv first.csv\n*/\n/*\n@item\n@csv second.csv\n*/";
        extract_into(text, Path::new("c_item.rs"), &mut context);
        assert_eq!(context.registry.len(), 1);
        let entry = context.registry.get("ITEM").expect("entry");
        assert_eq!(entry.name, "item");
        assert_eq!(entry.csv, "second.csv");
    }
}
