use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::lock::set_writable;
use super::DriverResult;

const ROTATED_SUFFIX: &str = "prev";

/// Previous outputs moved aside for the duration of one build.
#[derive(Debug, Default)]
pub struct Rotation {
    moved: Vec<(PathBuf, PathBuf)>,
}

impl Rotation {
    /// Move every existing output `X` to `X.prev`.
    ///
    /// A leftover `X.prev` without `X` is the only copy from an interrupted
    /// build and is kept as is.
    pub fn start(outputs: &[&Path]) -> DriverResult<Self> {
        let mut rotation = Rotation::default();
        for output in outputs {
            let rotated = rotated_path(output);
            if !output.exists() {
                continue;
            }
            if rotated.exists() {
                set_writable(&rotated)?;
                fs::remove_file(&rotated)?;
            }
            fs::rename(output, &rotated)?;
            debug!(event = "output_rotated", path = %output.display());
            rotation.moved.push((output.to_path_buf(), rotated));
        }
        Ok(rotation)
    }

    /// Put the rotated files back in place.
    pub fn restore(self) -> DriverResult<()> {
        for (output, rotated) in self.moved {
            if output.exists() {
                set_writable(&output)?;
                fs::remove_file(&output)?;
            }
            fs::rename(&rotated, &output)?;
            warn!(event = "output_restored", path = %output.display());
        }
        Ok(())
    }

    /// Delete the rotated files once new outputs are in place.
    pub fn discard(self) -> DriverResult<()> {
        for (_, rotated) in self.moved {
            set_writable(&rotated)?;
            fs::remove_file(&rotated)?;
        }
        Ok(())
    }
}

pub fn rotated_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(".");
    name.push(ROTATED_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tablegen_{tag}_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn restore_puts_previous_outputs_back() {
        let dir = temp_dir("rotate_restore");
        let table = dir.join("table.rs");
        let after = dir.join("table_after_load.rs");
        fs::write(&table, "// old table\n").expect("write");

        let rotation = Rotation::start(&[table.as_path(), after.as_path()]).expect("rotate");
        assert!(!table.exists());
        assert!(rotated_path(&table).exists());
        assert!(!rotated_path(&after).exists());

        fs::write(&table, "// partial\n").expect("write");
        rotation.restore().expect("restore");
        assert_eq!(fs::read_to_string(&table).expect("read"), "// old table\n");
        assert!(!rotated_path(&table).exists());
        assert!(!after.exists());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn discard_removes_rotated_copies() {
        let dir = temp_dir("rotate_discard");
        let table = dir.join("table.rs");
        fs::write(&table, "// old table\n").expect("write");
        crate::driver::lock::set_readonly(&table).expect("readonly");

        let rotation = Rotation::start(&[table.as_path()]).expect("rotate");
        rotation.discard().expect("discard");
        assert!(!table.exists());
        assert!(!rotated_path(&table).exists());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn orphaned_rotation_is_kept() {
        let dir = temp_dir("rotate_orphan");
        let table = dir.join("table.rs");
        fs::write(rotated_path(&table), "// interrupted\n").expect("write");

        let rotation = Rotation::start(&[table.as_path()]).expect("rotate");
        rotation.discard().expect("discard");
        assert_eq!(
            fs::read_to_string(rotated_path(&table)).expect("read"),
            "// interrupted\n"
        );
        fs::remove_dir_all(dir).ok();
    }
}
