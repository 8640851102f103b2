//! Deterministic names used in generated code.

use heck::{ToShoutySnakeCase, ToSnakeCase};

/// Static holding a table's primary storage, e.g. `Item` -> `TABLE_ITEM`.
pub fn storage_var_name(type_name: &str) -> String {
    format!("TABLE_{}", type_name.to_shouty_snake_case())
}

/// Function-name fragment for a table type, e.g. `ItemDrop` -> `item_drop`.
pub fn fn_suffix(type_name: &str) -> String {
    type_name.to_snake_case()
}

/// Parameter name for a key field. Raw identifiers lose their prefix and
/// `type` becomes `typ`.
pub fn param_name(field: &str) -> String {
    let name = field.trim_start_matches("r#");
    if name == "type" {
        "typ".to_string()
    } else {
        name.to_string()
    }
}

/// True when `name` is a plain (non-raw) Rust identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    name != "_" && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_names_are_screaming_snake() {
        assert_eq!(storage_var_name("Item"), "TABLE_ITEM");
        assert_eq!(storage_var_name("ItemDrop"), "TABLE_ITEM_DROP");
    }

    #[test]
    fn param_names_avoid_keywords() {
        assert_eq!(param_name("r#type"), "typ");
        assert_eq!(param_name("level"), "level");
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("ByLevel"));
        assert!(is_identifier("_hidden"));
        assert!(!is_identifier("by level"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier("_"));
        assert!(!is_identifier(""));
    }
}
