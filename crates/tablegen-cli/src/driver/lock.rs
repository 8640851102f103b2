use std::fs::{self, Permissions};
use std::io;
use std::path::Path;

/// Mark a generated file read-only.
pub fn set_readonly(path: &Path) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_readonly(true);
    fs::set_permissions(path, permissions)
}

/// Give the owner write access back, e.g. before deleting a rotated copy.
pub fn set_writable(path: &Path) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    owner_writable(&mut permissions);
    fs::set_permissions(path, permissions)
}

#[cfg(unix)]
fn owner_writable(permissions: &mut Permissions) {
    use std::os::unix::fs::PermissionsExt;
    permissions.set_mode(permissions.mode() | 0o200);
}

#[cfg(not(unix))]
fn owner_writable(permissions: &mut Permissions) {
    permissions.set_readonly(false);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_write_access() {
        let path = std::env::temp_dir().join(format!("tablegen_lock_{}.rs", uuid::Uuid::new_v4()));
        fs::write(&path, "// generated\n").expect("write");

        set_readonly(&path).expect("readonly");
        assert!(fs::metadata(&path).expect("metadata").permissions().readonly());

        set_writable(&path).expect("writable");
        assert!(!fs::metadata(&path).expect("metadata").permissions().readonly());
        fs::remove_file(path).ok();
    }
}
