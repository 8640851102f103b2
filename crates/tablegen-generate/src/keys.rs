//! Rust expressions for table keys.
//!
//! The accessor, the loader and `get_key` must agree on how a key value is
//! built from its fields; all three go through [`compose`].

use tablegen_core::{KeyField, KeyKind, KeyRepr, KeySchema};

/// Build the map key from one expression per key field. Packed fields are
/// all lossless in `i64`; see [`KeySchema::repr`].
pub fn compose(key: &KeySchema, mut field_expr: impl FnMut(&KeyField) -> String) -> String {
    let fields = key.fields();
    match key.repr() {
        KeyRepr::Scalar => field_expr(&fields[0]),
        KeyRepr::Packed2 | KeyRepr::Packed3 => {
            let constructor = key.map_key_type();
            let args: Vec<String> = fields
                .iter()
                .map(|field| format!("{} as i64", field_expr(field)))
                .collect();
            format!("{constructor}::new({})", args.join(", "))
        }
        KeyRepr::Formatted => {
            let pattern = vec!["{}"; fields.len()].join("_");
            let args: Vec<String> = fields.iter().map(&mut field_expr).collect();
            format!("format!(\"{pattern}\", {})", args.join(", "))
        }
    }
}

/// Parameter list of the key accessor, e.g. `key: i32` or `a: i32, b: &str`.
pub fn accessor_params(key: &KeySchema) -> String {
    if key.is_composite() {
        key.fields()
            .iter()
            .map(|field| format!("{}: {}", field.param_name(), field.param_type()))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        format!("key: {}", key.fields()[0].param_type())
    }
}

/// Argument passed to `HashMap::get` inside the accessor, plus an optional
/// binding that must precede it.
pub fn accessor_lookup(key: &KeySchema) -> (Option<String>, String) {
    if key.is_composite() {
        let value = compose(key, |field| field.param_name());
        (Some(format!("let key = {value};")), "&key".to_string())
    } else {
        match key.key_kind() {
            KeyKind::Integer => (None, "&key".to_string()),
            KeyKind::Text => (None, "key".to_string()),
        }
    }
}

/// Body of `get_key(&self)`.
pub fn get_key_body(key: &KeySchema) -> String {
    compose(key, |field| owned_field("self", field, key.is_composite()))
}

/// Expression keying a loaded row named `row`.
pub fn row_key(key: &KeySchema) -> String {
    if key.is_explicit() {
        "row.get_key()".to_string()
    } else {
        owned_field("row", &key.fields()[0], false)
    }
}

/// Field access yielding an owned value. Text fields inside a composite key
/// only feed `format!`, so they are borrowed.
fn owned_field(receiver: &str, field: &KeyField, composite: bool) -> String {
    match field.kind {
        KeyKind::Text if !composite => format!("{receiver}.{}.clone()", field.name),
        _ => format!("{receiver}.{}", field.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(fields: &[(&str, &str)], explicit: bool) -> KeySchema {
        let fields = fields
            .iter()
            .map(|(name, ty)| KeyField::new(*name, *ty).expect("key field"))
            .collect();
        KeySchema::new("T", fields, explicit).expect("schema")
    }

    #[test]
    fn scalar_keys() {
        let key = schema(&[("id", "i32")], false);
        assert_eq!(accessor_params(&key), "key: i32");
        assert_eq!(accessor_lookup(&key), (None, "&key".to_string()));
        assert_eq!(row_key(&key), "row.id");

        let key = schema(&[("code", "String")], true);
        assert_eq!(accessor_params(&key), "key: &str");
        assert_eq!(accessor_lookup(&key), (None, "key".to_string()));
        assert_eq!(get_key_body(&key), "self.code.clone()");
        assert_eq!(row_key(&key), "row.get_key()");
    }

    #[test]
    fn packed_keys() {
        let key = schema(&[("group", "u32"), ("r#type", "u8")], true);
        assert_eq!(accessor_params(&key), "group: u32, typ: u8");
        assert_eq!(
            accessor_lookup(&key).0.as_deref(),
            Some("let key = Key2::new(group as i64, typ as i64);")
        );
        assert_eq!(
            get_key_body(&key),
            "Key2::new(self.group as i64, self.r#type as i64)"
        );

        let key = schema(&[("a", "i32"), ("b", "i32"), ("c", "i16")], true);
        assert_eq!(
            get_key_body(&key),
            "Key3::new(self.a as i64, self.b as i64, self.c as i64)"
        );
    }

    #[test]
    fn formatted_keys() {
        let key = schema(&[("a", "i32"), ("b", "String")], true);
        assert_eq!(accessor_params(&key), "a: i32, b: &str");
        assert_eq!(
            accessor_lookup(&key),
            (
                Some("let key = format!(\"{}_{}\", a, b);".to_string()),
                "&key".to_string()
            )
        );
        assert_eq!(get_key_body(&key), "format!(\"{}_{}\", self.a, self.b)");

        let key = schema(&[("shard", "u16"), ("seq", "u64")], true);
        assert_eq!(
            get_key_body(&key),
            "format!(\"{}_{}\", self.shard, self.seq)"
        );
        assert_eq!(
            accessor_lookup(&key).0.as_deref(),
            Some("let key = format!(\"{}_{}\", shard, seq);")
        );

        let key = schema(&[("a", "u8"), ("b", "u8"), ("c", "u8"), ("d", "u8")], true);
        assert_eq!(
            get_key_body(&key),
            "format!(\"{}_{}_{}_{}\", self.a, self.b, self.c, self.d)"
        );
    }
}
