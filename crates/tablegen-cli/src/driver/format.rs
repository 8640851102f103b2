use std::path::Path;
use std::process::Command;

use tracing::{debug, error};

use super::{DriverError, DriverResult};
use crate::config::FormatterSettings;

/// Rewrites a generated file in place.
pub trait Formatter {
    fn format(&self, path: &Path) -> DriverResult<()>;
}

/// External `rustfmt`-compatible program.
#[derive(Debug, Clone)]
pub struct Rustfmt {
    program: String,
    edition: String,
}

impl Formatter for Rustfmt {
    fn format(&self, path: &Path) -> DriverResult<()> {
        let output = Command::new(&self.program)
            .arg("--edition")
            .arg(&self.edition)
            .arg(path)
            .output()
            .map_err(|source| DriverError::FormatterSpawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(
                event = "format_failed",
                program = %self.program,
                path = %path.display(),
                stderr = %stderr.trim()
            );
            return Err(DriverError::FormatterFailed {
                program: self.program.clone(),
                path: path.to_path_buf(),
                status: output.status.to_string(),
            });
        }
        debug!(event = "formatted", path = %path.display());
        Ok(())
    }
}

/// Leaves files untouched.
#[derive(Debug, Clone, Copy)]
pub struct NoFormat;

impl Formatter for NoFormat {
    fn format(&self, _path: &Path) -> DriverResult<()> {
        Ok(())
    }
}

pub fn formatter_for(settings: &FormatterSettings) -> Box<dyn Formatter> {
    if settings.enabled {
        Box::new(Rustfmt {
            program: settings.program.clone(),
            edition: settings.edition.clone(),
        })
    } else {
        Box::new(NoFormat)
    }
}
