mod config;
mod driver;

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use config::{load_settings, GenerateSettings};
use driver::{formatter_for, init_logging, inspect, Driver};
use serde::Serialize;
use tablegen_core::{Diagnostics, ResolvedTable};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("{0}")]
    Driver(#[from] driver::DriverError),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{errors} table(s) could not be resolved")]
    Unresolved { errors: usize },
}

#[derive(Parser, Debug)]
#[command(
    name = "tablegen",
    version,
    about = "Generate table storage and accessors from annotated declarations"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Regenerate both artifacts.
    Generate(GenerateArgs),
    /// Print resolved tables and diagnostics as JSON.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Directory holding the declaration files.
    #[arg(long, default_value = ".")]
    dir: PathBuf,
    /// Settings file (defaults to tablegen.toml in the declaration directory).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Declaration file name prefix.
    #[arg(long)]
    prefix: Option<String>,
    /// Attribute marking key fields.
    #[arg(long)]
    key_marker: Option<String>,
    /// Log filter for stderr output.
    #[arg(long, default_value = "info")]
    log_level: String,
    /// Also append JSON logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Base import path of the downstream `tools` module.
    #[arg(long)]
    base: Option<String>,
    /// Output directory (defaults to the declaration directory).
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// File name of the primary artifact.
    #[arg(long)]
    primary_output: Option<String>,
    /// File name of the secondary artifact.
    #[arg(long)]
    secondary_output: Option<String>,
    /// Skip the external formatter.
    #[arg(long, default_value_t = false)]
    no_format: bool,
    /// Edition passed to the formatter.
    #[arg(long)]
    edition: Option<String>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Write the report here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Serialize)]
struct InspectReport<'a> {
    tables: &'a [ResolvedTable],
    diagnostics: &'a Diagnostics,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Inspect(args) => run_inspect(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        common,
        base,
        out_dir,
        primary_output,
        secondary_output,
        no_format,
        edition,
    } = args;

    let mut settings = settings_for(&common)?;
    if let Some(base) = base {
        settings.base = base;
    }
    if let Some(out_dir) = out_dir {
        settings.out_dir = Some(out_dir);
    }
    if let Some(primary_output) = primary_output {
        settings.primary_output = primary_output;
    }
    if let Some(secondary_output) = secondary_output {
        settings.secondary_output = secondary_output;
    }
    if no_format {
        settings.formatter.enabled = false;
    }
    if let Some(edition) = edition {
        settings.formatter.edition = edition;
    }

    let formatter = formatter_for(&settings.formatter);
    let report = Driver::new(&common.dir, settings, formatter).run()?;
    tracing::info!(
        event = "run_finished",
        status = "success",
        tables = report.tables,
        warnings = report.warnings,
        primary = %report.primary.display(),
        secondary = %report.secondary.display()
    );
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<(), CliError> {
    let InspectArgs { common, out } = args;
    let settings = settings_for(&common)?;

    let result = inspect(&common.dir, &settings)?;
    let report = InspectReport {
        tables: &result.tables,
        diagnostics: &result.context.diagnostics,
    };
    let encoded = serde_json::to_string_pretty(&report)?;
    match out {
        Some(path) => std::fs::write(&path, encoded)?,
        None => writeln!(std::io::stdout(), "{encoded}")?,
    }

    if result.context.is_fatal() {
        return Err(CliError::Unresolved {
            errors: result.context.diagnostics.errors().count(),
        });
    }
    Ok(())
}

/// Settings from file, with the shared flags applied and logging started.
fn settings_for(common: &CommonArgs) -> Result<GenerateSettings, CliError> {
    init_logging(&common.log_level, common.log_file.as_deref())?;

    let mut settings = load_settings(&common.dir, common.config.as_deref())?;
    if let Some(prefix) = &common.prefix {
        settings.prefix = prefix.clone();
    }
    if let Some(key_marker) = &common.key_marker {
        settings.key_marker = key_marker.clone();
    }
    tracing::debug!(event = "settings_loaded", dir = %common.dir.display(), ?settings);
    Ok(settings)
}
