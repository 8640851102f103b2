use std::fs;
use std::path::PathBuf;

use tablegen_core::{KeyKind, KeyRepr, Pattern};
use tablegen_introspect::{introspect, IntrospectError, IntrospectOptions};

const ITEM: &str = r#"
/* @Item
 @csv data/item.csv
 @excel data/item.xlsx
*/
pub struct Item {
    pub id: i32,
    pub name: String,
    pub level: i32,
}

impl Item {
    pub fn key_slice(&self, j: usize) -> bool {
        match j {
            0 => self.level > 10,
            _ => !self.name.is_empty(),
        }
    }

    pub fn key_slice_name() -> Vec<&'static str> {
        vec!["ByLevel", "ByQuality"]
    }

    pub fn key_slice_sort(slice: &mut Vec<i32>, _j: usize) {
        slice.sort();
    }

    pub fn after_load(_table: &ItemTable) {}
}
"#;

const SKILL: &str = r#"
/* @Skill
 @csv data/skill.csv
 @excel data/skill.xlsx
 @depend Item|Buff
*/
pub struct Skill {
    #[table(key)]
    pub a: i32,
    #[table(key)]
    pub b: String,
    pub power: u32,
}
"#;

fn fixture_dir(tag: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tablegen_{tag}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create fixture dir");
    for (name, text) in files {
        fs::write(dir.join(name), text).expect("write fixture");
    }
    dir
}

#[test]
fn resolves_item_and_skill() {
    let dir = fixture_dir(
        "resolve",
        &[
            ("c_skill.rs", SKILL),
            ("c_item.rs", ITEM),
            ("notes.rs", "/* @Ignored */ pub struct Ignored { id: i32 }"),
        ],
    );
    let result = introspect(&dir, &IntrospectOptions::default()).expect("introspect");
    assert!(!result.context.is_fatal());

    let names: Vec<_> = result.tables.iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["Item", "Skill"]);

    let item = &result.tables[0];
    assert_eq!(item.storage_var, "TABLE_ITEM");
    assert!(!item.key.is_explicit());
    assert_eq!(item.key.key_kind(), KeyKind::Integer);
    assert_eq!(item.entry.csv, "data/item.csv");
    assert_eq!(item.entry.excel, "data/item.xlsx");
    let key_slice = item.capabilities.index(Pattern::KeySlice).expect("key slice");
    let variants: Vec<_> = key_slice.variants.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(variants, vec!["ByLevel", "ByQuality"]);
    assert!(key_slice.has_sort);
    assert!(item.capabilities.value_slice.is_none());
    assert!(item.capabilities.has_after_load);

    let skill = &result.tables[1];
    assert!(skill.key.is_explicit());
    assert_eq!(skill.key.repr(), KeyRepr::Formatted);
    assert_eq!(skill.key.key_kind(), KeyKind::Text);
    assert_eq!(skill.entry.depend, vec!["Item", "Buff"]);
    assert!(!skill.capabilities.has_secondary());

    fs::remove_dir_all(dir).ok();
}

#[test]
fn reports_every_missing_key() {
    let dir = fixture_dir(
        "missing",
        &[
            ("c_buff.rs", "/* @Buff */\npub struct Buff { level: i32 }\n"),
            ("c_quest.rs", "/* @Quest */\npub struct Quest { step: u8 }\n"),
            ("c_item.rs", ITEM),
        ],
    );
    let result = introspect(&dir, &IntrospectOptions::default()).expect("introspect");
    assert!(result.context.is_fatal());
    assert!(result.tables.is_empty());

    let subjects: Vec<_> = result
        .context
        .diagnostics
        .errors()
        .map(|d| (d.code.as_str(), d.subject.as_str()))
        .collect();
    assert_eq!(subjects, vec![("missing_key", "Buff"), ("missing_key", "Quest")]);

    fs::remove_dir_all(dir).ok();
}

#[test]
fn missing_declaration_aborts_immediately() {
    let dir = fixture_dir("notfound", &[("c_ghost.rs", "/* @Ghost */\npub struct Other { id: i32 }\n")]);
    let err = introspect(&dir, &IntrospectOptions::default()).expect_err("type not found");
    assert!(matches!(err, IntrospectError::TypeNotFound(name) if name == "Ghost"));
    fs::remove_dir_all(dir).ok();
}

#[test]
fn empty_declaration_aborts_immediately() {
    let dir = fixture_dir("empty", &[("c_unit.rs", "/* @Unit */\npub struct Unit {}\n")]);
    let err = introspect(&dir, &IntrospectOptions::default()).expect_err("empty type");
    assert!(matches!(err, IntrospectError::EmptyType { ref name, .. } if name == "Unit"));
    fs::remove_dir_all(dir).ok();
}

#[test]
fn non_literal_names_fall_back_to_default_variant() {
    let source = r#"
/* @Loot
 @csv data/loot.csv
*/
pub struct Loot {
    #[table(key)]
    pub group: u32,
    #[table(key)]
    pub slot: u8,
}

const NAMES: [&str; 1] = ["ByGroup"];

impl Loot {
    pub fn value_slice(&self, _j: usize) -> bool { true }
    pub fn value_slice_name() -> Vec<&'static str> { NAMES.to_vec() }
}
"#;
    let dir = fixture_dir("fallback", &[("c_loot.rs", source)]);
    let result = introspect(&dir, &IntrospectOptions::default()).expect("introspect");
    assert!(!result.context.is_fatal());

    let loot = &result.tables[0];
    assert_eq!(loot.key.repr(), KeyRepr::Packed2);
    let index = loot.capabilities.index(Pattern::ValueSlice).expect("value slice");
    assert_eq!(index.variants.len(), 1);
    assert_eq!(index.variants[0].name, "Loot");
    assert!(!index.variants[0].custom);
    assert!(!index.has_sort);

    let warnings: Vec<_> = result
        .context
        .diagnostics
        .warnings()
        .map(|d| d.code.as_str())
        .collect();
    assert_eq!(warnings, vec!["custom_names_fallback"]);

    fs::remove_dir_all(dir).ok();
}

#[test]
fn unsupported_key_type_is_reported_with_its_line() {
    let source = "/* @Rate */\npub struct Rate {\n    #[table(key)]\n    pub value: f64,\n}\n";
    let dir = fixture_dir("unsupported", &[("c_rate.rs", source)]);
    let result = introspect(&dir, &IntrospectOptions::default()).expect("introspect");
    assert!(result.context.is_fatal());

    let error = result.context.diagnostics.errors().next().expect("error");
    assert_eq!(error.code, "unsupported_key_kind");
    assert!(error.message.starts_with("line 4:"), "{}", error.message);

    fs::remove_dir_all(dir).ok();
}

#[test]
fn case_folded_type_names_are_rejected() {
    let dir = fixture_dir(
        "collision",
        &[
            ("c_drop.rs", "/* @ItemDrop */\npub struct ItemDrop { id: i32 }\n"),
            (
                "c_drop_legacy.rs",
                "/* @Item_Drop */\n#[allow(non_camel_case_types)]\npub struct Item_Drop { id: i32 }\n",
            ),
            ("c_item.rs", ITEM),
        ],
    );
    let result = introspect(&dir, &IntrospectOptions::default()).expect("introspect");
    assert!(result.context.is_fatal());
    assert!(result.tables.is_empty());
    assert_eq!(result.context.registry.len(), 3);

    let errors: Vec<_> = result.context.diagnostics.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "name_collision");
    assert_eq!(errors[0].subject, "Item_Drop");
    assert!(errors[0].message.contains("'ItemDrop'"));

    fs::remove_dir_all(dir).ok();
}
