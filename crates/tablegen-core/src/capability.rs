use heck::{ToShoutySnakeCase, ToSnakeCase};
use serde::Serialize;

/// Method a table type declares to receive the post-load hook.
pub const AFTER_LOAD_METHOD: &str = "after_load";

/// Supported secondary-index patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// Slice of keys, filtered and optionally sorted.
    KeySlice,
    /// Slice of rows, filtered and optionally sorted.
    ValueSlice,
}

impl Pattern {
    pub const ALL: [Pattern; 2] = [Pattern::KeySlice, Pattern::ValueSlice];

    /// Method whose presence opts a type into this pattern.
    pub fn probe_method(self) -> &'static str {
        match self {
            Pattern::KeySlice => "key_slice",
            Pattern::ValueSlice => "value_slice",
        }
    }

    /// Method returning the literal list of custom variant names.
    pub fn names_method(self) -> &'static str {
        match self {
            Pattern::KeySlice => "key_slice_name",
            Pattern::ValueSlice => "value_slice_name",
        }
    }

    /// Associated function invoked on each finished holder.
    pub fn sort_method(self) -> &'static str {
        match self {
            Pattern::KeySlice => "key_slice_sort",
            Pattern::ValueSlice => "value_slice_sort",
        }
    }

    fn holder_suffix(self) -> &'static str {
        match self {
            Pattern::KeySlice => "KeySlice",
            Pattern::ValueSlice => "ValueSlice",
        }
    }

    fn storage_prefix(self) -> &'static str {
        match self {
            Pattern::KeySlice => "SLICE_KEY",
            Pattern::ValueSlice => "SLICE_VALUE",
        }
    }
}

/// One named instance of a secondary-index pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub name: String,
    /// False for the single default variant named after the table type.
    pub custom: bool,
}

impl Variant {
    pub fn holder_type(&self, pattern: Pattern) -> String {
        format!("{}{}", self.name, pattern.holder_suffix())
    }

    pub fn storage_var(&self, pattern: Pattern) -> String {
        format!("{}_{}", pattern.storage_prefix(), self.name.to_shouty_snake_case())
    }

    /// Accessor function name. Custom variants are reached by their own
    /// name, the default variant by its holder type.
    pub fn accessor_name(&self, pattern: Pattern) -> String {
        if self.custom {
            self.name.to_snake_case()
        } else {
            self.holder_type(pattern).to_snake_case()
        }
    }
}

/// A secondary index a table opted into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecondaryIndex {
    pub pattern: Pattern,
    pub variants: Vec<Variant>,
    pub has_sort: bool,
}

impl SecondaryIndex {
    /// Single variant named after the table type.
    pub fn default_for(table: &str, pattern: Pattern, has_sort: bool) -> Self {
        Self {
            pattern,
            variants: vec![Variant {
                name: table.to_string(),
                custom: false,
            }],
            has_sort,
        }
    }

    /// One variant per custom name, in written order.
    pub fn custom(pattern: Pattern, names: Vec<String>, has_sort: bool) -> Self {
        Self {
            pattern,
            variants: names
                .into_iter()
                .map(|name| Variant { name, custom: true })
                .collect(),
            has_sort,
        }
    }
}

/// Optional generation patterns a table type opted into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapabilityDescriptor {
    pub key_slice: Option<SecondaryIndex>,
    pub value_slice: Option<SecondaryIndex>,
    pub has_after_load: bool,
}

impl CapabilityDescriptor {
    pub fn index(&self, pattern: Pattern) -> Option<&SecondaryIndex> {
        match pattern {
            Pattern::KeySlice => self.key_slice.as_ref(),
            Pattern::ValueSlice => self.value_slice.as_ref(),
        }
    }

    pub fn set_index(&mut self, index: SecondaryIndex) {
        match index.pattern {
            Pattern::KeySlice => self.key_slice = Some(index),
            Pattern::ValueSlice => self.value_slice = Some(index),
        }
    }

    /// Present indexes in pattern order.
    pub fn indexes(&self) -> impl Iterator<Item = &SecondaryIndex> {
        self.key_slice.iter().chain(self.value_slice.iter())
    }

    pub fn has_secondary(&self) -> bool {
        self.key_slice.is_some() || self.value_slice.is_some()
    }
}
