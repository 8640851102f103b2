/// Options that control how declaration files are found and read.
#[derive(Debug, Clone)]
pub struct IntrospectOptions {
    /// File-name prefix of declaration files, compared case-insensitively.
    pub prefix: String,
    /// Attribute marking key fields, e.g. `table` for `#[table(key)]`.
    pub key_marker: String,
}

impl Default for IntrospectOptions {
    fn default() -> Self {
        Self {
            prefix: "c_".to_string(),
            key_marker: "table".to_string(),
        }
    }
}
