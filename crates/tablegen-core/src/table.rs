use std::path::PathBuf;

use serde::Serialize;

use crate::capability::CapabilityDescriptor;
use crate::error::{Error, Result};
use crate::naming;

/// One annotated table type as read from a declaration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableEntry {
    /// Type identifier exactly as written in the annotation.
    pub name: String,
    /// Csv row-data path, passed through to the generated loader.
    pub csv: String,
    /// Spreadsheet row-data path, passed through to the generated loader.
    pub excel: String,
    /// Tables this one declares it depends on. Advisory only.
    pub depend: Vec<String>,
    /// Declaration file the annotation block came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<PathBuf>,
}

impl TableEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Registry key: the lowercase type name.
    pub fn registry_key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Name of the static holding this table's primary storage.
    pub fn storage_var_name(&self) -> String {
        naming::storage_var_name(&self.name)
    }
}

/// Basic kind of a key field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    Integer,
    Text,
}

impl KeyKind {
    /// Infer the kind from the last path segment of a declared field type.
    pub fn from_type_name(ty: &str) -> Option<Self> {
        match ty {
            "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
            | "u128" | "usize" => Some(KeyKind::Integer),
            "String" => Some(KeyKind::Text),
            _ => None,
        }
    }
}

/// A single field participating in a table key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyField {
    pub name: String,
    pub kind: KeyKind,
    /// Declared Rust type, used verbatim in generated signatures.
    pub rust_type: String,
}

impl KeyField {
    /// Build a key field, inferring its kind from the declared type.
    pub fn new(name: impl Into<String>, rust_type: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let rust_type = rust_type.into();
        let kind = KeyKind::from_type_name(&rust_type).ok_or_else(|| Error::UnsupportedKeyType {
            field: name.clone(),
            ty: rust_type.clone(),
        })?;
        Ok(Self {
            name,
            kind,
            rust_type,
        })
    }

    /// True when every value of the declared type converts to `i64` without
    /// loss, so the field can be packed into `Key2`/`Key3`.
    pub fn packs_into_i64(&self) -> bool {
        matches!(
            self.rust_type.as_str(),
            "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32"
        )
    }

    /// Parameter name used for this field in generated accessors.
    pub fn param_name(&self) -> String {
        naming::param_name(&self.name)
    }

    /// Parameter type used for this field in generated accessors.
    pub fn param_type(&self) -> &str {
        match self.kind {
            KeyKind::Integer => &self.rust_type,
            KeyKind::Text => "&str",
        }
    }
}

/// In-memory representation of a table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyRepr {
    /// Single field, stored with its declared type.
    Scalar,
    /// Two integer fields packed into `Key2`.
    Packed2,
    /// Three integer fields packed into `Key3`.
    Packed3,
    /// Fields rendered into a `_`-joined string.
    Formatted,
}

/// Ordered key fields of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySchema {
    fields: Vec<KeyField>,
    explicit: bool,
}

impl KeySchema {
    /// Create a key schema. `explicit` is set when the fields came from key
    /// tags rather than the implicit `id` field.
    pub fn new(table: &str, fields: Vec<KeyField>, explicit: bool) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::EmptyKeySchema(table.to_string()));
        }
        Ok(Self { fields, explicit })
    }

    pub fn fields(&self) -> &[KeyField] {
        &self.fields
    }

    /// True when the key came from tagged fields.
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    pub fn is_composite(&self) -> bool {
        self.fields.len() > 1
    }

    pub fn all_integer(&self) -> bool {
        self.fields.iter().all(|field| field.kind == KeyKind::Integer)
    }

    /// Kind used for identifier and lookup purposes. Composite keys are
    /// always text-like.
    pub fn key_kind(&self) -> KeyKind {
        if self.is_composite() {
            KeyKind::Text
        } else {
            self.fields[0].kind
        }
    }

    /// Composite integer keys are packed only when every field fits in an
    /// `i64`. Wider fields fall back to the formatted string key.
    pub fn repr(&self) -> KeyRepr {
        let packable = self.fields.iter().all(KeyField::packs_into_i64);
        match (self.fields.len(), packable) {
            (1, _) => KeyRepr::Scalar,
            (2, true) => KeyRepr::Packed2,
            (3, true) => KeyRepr::Packed3,
            _ => KeyRepr::Formatted,
        }
    }

    /// Rust type of the keys in the generated storage map.
    pub fn map_key_type(&self) -> &str {
        match self.repr() {
            KeyRepr::Scalar => &self.fields[0].rust_type,
            KeyRepr::Packed2 => "Key2",
            KeyRepr::Packed3 => "Key3",
            KeyRepr::Formatted => "String",
        }
    }
}

/// A table with everything the emitter needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTable {
    pub entry: TableEntry,
    pub storage_var: String,
    pub key: KeySchema,
    pub capabilities: CapabilityDescriptor,
}

impl ResolvedTable {
    pub fn name(&self) -> &str {
        &self.entry.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, ty: &str) -> KeyField {
        KeyField::new(name, ty).expect("supported key type")
    }

    #[test]
    fn single_integer_key_is_scalar() {
        let key = KeySchema::new("Item", vec![field("id", "i32")], false).unwrap();
        assert!(!key.is_composite());
        assert_eq!(key.key_kind(), KeyKind::Integer);
        assert_eq!(key.repr(), KeyRepr::Scalar);
        assert_eq!(key.map_key_type(), "i32");
    }

    #[test]
    fn composite_keys_are_text_like() {
        let mixed = KeySchema::new("Skill", vec![field("a", "i32"), field("b", "String")], true)
            .unwrap();
        assert!(mixed.is_composite());
        assert!(!mixed.all_integer());
        assert_eq!(mixed.key_kind(), KeyKind::Text);
        assert_eq!(mixed.repr(), KeyRepr::Formatted);

        let packed = KeySchema::new("Drop", vec![field("a", "u32"), field("b", "i64")], true)
            .unwrap();
        assert!(packed.all_integer());
        assert_eq!(packed.key_kind(), KeyKind::Text);
        assert_eq!(packed.repr(), KeyRepr::Packed2);
        assert_eq!(packed.map_key_type(), "Key2");
    }

    #[test]
    fn wide_integer_keys_fall_back_to_text() {
        let fields = ["a", "b", "c", "d"]
            .iter()
            .map(|name| field(name, "i32"))
            .collect();
        let key = KeySchema::new("Wide", fields, true).unwrap();
        assert!(key.all_integer());
        assert_eq!(key.repr(), KeyRepr::Formatted);
        assert_eq!(key.map_key_type(), "String");
    }

    #[test]
    fn integers_wider_than_i64_are_not_packed() {
        for ty in ["u64", "usize", "u128", "i128"] {
            let key = KeySchema::new("Ledger", vec![field("shard", "u16"), field("seq", ty)], true)
                .unwrap();
            assert!(key.all_integer());
            assert_eq!(key.repr(), KeyRepr::Formatted, "{ty}");
            assert_eq!(key.map_key_type(), "String");
        }

        let key = KeySchema::new(
            "Ledger",
            vec![field("a", "isize"), field("b", "u32"), field("c", "i8")],
            true,
        )
        .unwrap();
        assert_eq!(key.repr(), KeyRepr::Packed3);
    }

    #[test]
    fn empty_schema_is_rejected() {
        let err = KeySchema::new("Nothing", Vec::new(), false).unwrap_err();
        assert!(matches!(err, Error::EmptyKeySchema(name) if name == "Nothing"));
    }

    #[test]
    fn unsupported_key_type_is_rejected() {
        let err = KeyField::new("when", "f64").unwrap_err();
        assert!(matches!(err, Error::UnsupportedKeyType { .. }));
    }
}
