use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{IntrospectError, Result};

/// List declaration files directly under `dir` whose name starts with
/// `prefix` (case-insensitive) and ends in `.rs`, sorted by path.
pub fn discover(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let read_dir = fs::read_dir(dir).map_err(|source| IntrospectError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let prefix = prefix.to_uppercase();
    let mut files = Vec::new();
    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(event = "dir_entry_skipped", dir = %dir.display(), error = %err);
                continue;
            }
        };
        let is_file = entry.file_type().map(|ty| ty.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.to_uppercase().starts_with(&prefix) && name.ends_with(".rs") {
            files.push(entry.path());
        }
    }

    files.sort();
    debug!(event = "discovered", files = ?files);
    Ok(files)
}
