/// Options for the emitter.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Base import path of the downstream crate's `tools` module.
    pub base: String,
    /// Module name of the primary artifact, e.g. `table`.
    pub primary_module: String,
    /// Module name of the secondary artifact, e.g. `table_after_load`.
    pub secondary_module: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            base: "crate::pkg".to_string(),
            primary_module: "table".to_string(),
            secondary_module: "table_after_load".to_string(),
        }
    }
}

/// Rendered text of both artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifacts {
    pub primary: String,
    pub secondary: String,
}
