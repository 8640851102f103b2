use std::path::{Path, PathBuf};
use std::time::Instant;

use tablegen_core::{GenerationContext, Severity};
use tablegen_generate::{Emitter, RenderedArtifacts};
use tablegen_introspect::{introspect, Introspection};
use tracing::{error, info, warn};

use super::atomic::write_bytes_atomic;
use super::format::Formatter;
use super::lock::set_readonly;
use super::rotate::Rotation;
use super::DriverResult;
use crate::config::GenerateSettings;

/// Summary of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub tables: usize,
    pub warnings: usize,
    pub primary: PathBuf,
    pub secondary: PathBuf,
}

/// Runs one full regeneration of both artifacts.
pub struct Driver {
    source_dir: PathBuf,
    settings: GenerateSettings,
    formatter: Box<dyn Formatter>,
}

impl Driver {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        settings: GenerateSettings,
        formatter: Box<dyn Formatter>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            settings,
            formatter,
        }
    }

    /// Rotate, regenerate, format and lock the outputs. Previous outputs
    /// are restored when nothing new could be written.
    pub fn run(&self) -> DriverResult<BuildReport> {
        let timer = Instant::now();
        let (primary, secondary) = self.settings.output_paths(&self.source_dir);
        info!(event = "build_started", dir = %self.source_dir.display());

        let rotation = Rotation::start(&[primary.as_path(), secondary.as_path()])?;
        let (rendered, tables, warnings) = match self.render() {
            Ok(result) => result,
            Err(err) => {
                error!(event = "build_failed", error = %err);
                rotation.restore()?;
                return Err(err);
            }
        };

        if let Err(err) = write_artifacts(&primary, &secondary, &rendered) {
            error!(event = "write_failed", error = %err);
            rotation.restore()?;
            return Err(err);
        }
        rotation.discard()?;
        info!(event = "artifacts_written", primary = %primary.display(), secondary = %secondary.display());

        for path in [&primary, &secondary] {
            self.formatter.format(path)?;
            set_readonly(path)?;
        }

        info!(
            event = "build_finished",
            tables,
            duration_ms = timer.elapsed().as_millis() as u64
        );
        Ok(BuildReport {
            tables,
            warnings,
            primary,
            secondary,
        })
    }

    fn render(&self) -> DriverResult<(RenderedArtifacts, usize, usize)> {
        let emit_options = self.settings.emit_options()?;
        let result = inspect(&self.source_dir, &self.settings)?;
        let rendered = Emitter::new(emit_options).emit(&result.context, &result.tables)?;
        let warnings = result.context.diagnostics.warnings().count();
        Ok((rendered, result.tables.len(), warnings))
    }
}

fn write_artifacts(primary: &Path, secondary: &Path, rendered: &RenderedArtifacts) -> DriverResult<()> {
    write_bytes_atomic(primary, rendered.primary.as_bytes())?;
    write_bytes_atomic(secondary, rendered.secondary.as_bytes())
}

/// Introspect `source_dir` and log every diagnostic.
pub fn inspect(source_dir: &Path, settings: &GenerateSettings) -> DriverResult<Introspection> {
    let result = introspect(source_dir, &settings.introspect_options())?;
    log_diagnostics(&result.context);
    Ok(result)
}

fn log_diagnostics(context: &GenerationContext) {
    for diagnostic in context.diagnostics.iter() {
        match diagnostic.severity {
            Severity::Error => error!(
                event = "diagnostic",
                code = %diagnostic.code,
                subject = %diagnostic.subject,
                "{}",
                diagnostic.message
            ),
            Severity::Warning => warn!(
                event = "diagnostic",
                code = %diagnostic.code,
                subject = %diagnostic.subject,
                "{}",
                diagnostic.message
            ),
        }
    }
}
