use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tablegen_core::naming::is_identifier;
use tablegen_generate::EmitOptions;
use tablegen_introspect::IntrospectOptions;

use super::{ConfigError, ConfigResult};

/// Settings file looked up in the declaration directory.
pub const SETTINGS_FILE: &str = "tablegen.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterSettings {
    pub enabled: bool,
    pub program: String,
    pub edition: String,
}

impl Default for FormatterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "rustfmt".to_string(),
            edition: "2021".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateSettings {
    /// Base import path of the downstream `tools` module.
    pub base: String,
    /// Declaration file name prefix.
    pub prefix: String,
    pub primary_output: String,
    pub secondary_output: String,
    /// Attribute marking key fields.
    pub key_marker: String,
    /// Output directory; the declaration directory when unset.
    pub out_dir: Option<PathBuf>,
    pub formatter: FormatterSettings,
}

impl Default for GenerateSettings {
    fn default() -> Self {
        let introspect = IntrospectOptions::default();
        Self {
            base: EmitOptions::default().base,
            prefix: introspect.prefix,
            primary_output: "table.rs".to_string(),
            secondary_output: "table_after_load.rs".to_string(),
            key_marker: introspect.key_marker,
            out_dir: None,
            formatter: FormatterSettings::default(),
        }
    }
}

impl GenerateSettings {
    pub fn introspect_options(&self) -> IntrospectOptions {
        IntrospectOptions {
            prefix: self.prefix.clone(),
            key_marker: self.key_marker.clone(),
        }
    }

    /// Emitter options. Module names are the output file stems.
    pub fn emit_options(&self) -> ConfigResult<EmitOptions> {
        Ok(EmitOptions {
            base: self.base.clone(),
            primary_module: module_name(&self.primary_output)?,
            secondary_module: module_name(&self.secondary_output)?,
        })
    }

    pub fn output_paths(&self, source_dir: &Path) -> (PathBuf, PathBuf) {
        let dir = self.out_dir.as_deref().unwrap_or(source_dir);
        (
            dir.join(&self.primary_output),
            dir.join(&self.secondary_output),
        )
    }
}

fn module_name(file: &str) -> ConfigResult<String> {
    let path = Path::new(file);
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| is_identifier(stem))
        .ok_or_else(|| {
            ConfigError::Invalid(format!("output '{file}' is not a valid module file name"))
        })?;
    if path.extension().and_then(|ext| ext.to_str()) != Some("rs") {
        return Err(ConfigError::Invalid(format!(
            "output '{file}' must be a .rs file"
        )));
    }
    Ok(stem.to_string())
}

/// Load settings from `explicit`, or from [`SETTINGS_FILE`] in `source_dir`
/// when present, or fall back to defaults.
pub fn load_settings(source_dir: &Path, explicit: Option<&Path>) -> ConfigResult<GenerateSettings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = source_dir.join(SETTINGS_FILE);
            if !path.is_file() {
                return Ok(GenerateSettings::default());
            }
            path
        }
    };

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Toml { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tablegen_{tag}_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = temp_dir("settings_default");
        let settings = load_settings(&dir, None).expect("settings");
        assert_eq!(settings, GenerateSettings::default());
        assert_eq!(settings.base, "crate::pkg");
        assert_eq!(settings.prefix, "c_");
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = temp_dir("settings_partial");
        std::fs::write(
            dir.join(SETTINGS_FILE),
            "base = \"game::pkg\"\n\n[formatter]\nenabled = false\n",
        )
        .expect("write settings");

        let settings = load_settings(&dir, None).expect("settings");
        assert_eq!(settings.base, "game::pkg");
        assert!(!settings.formatter.enabled);
        assert_eq!(settings.formatter.program, "rustfmt");
        assert_eq!(settings.primary_output, "table.rs");
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = temp_dir("settings_explicit");
        let err = load_settings(&dir, Some(&dir.join("missing.toml"))).expect_err("missing");
        assert!(matches!(err, ConfigError::Io { .. }));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn module_names_come_from_output_files() {
        let settings = GenerateSettings {
            primary_output: "tables.rs".to_string(),
            ..GenerateSettings::default()
        };
        let options = settings.emit_options().expect("options");
        assert_eq!(options.primary_module, "tables");
        assert_eq!(options.secondary_module, "table_after_load");

        let bad = GenerateSettings {
            secondary_output: "after-load.rs".to_string(),
            ..GenerateSettings::default()
        };
        assert!(matches!(bad.emit_options(), Err(ConfigError::Invalid(_))));
    }
}
