//! [`FakeBin`] fixture for collaborator tests.
//!
//! Creates shell-script executables in a private directory and records each
//! invocation's arguments to a log, so tests can assert what would have been
//! run without touching the real package manager.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct FakeBin {
    dir: TempDir,
}

impl Default for FakeBin {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBin {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Directory to put on `PATH`.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the call log for `name`.
    pub fn log_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(format!("{name}.calls"))
    }

    /// Install an executable `name` that appends its arguments to its log
    /// and exits with `exit_code`.
    #[cfg(unix)]
    pub fn install(&self, name: &str, exit_code: i32) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.dir.path().join(name);
        let script = format!(
            "#!/bin/sh\necho \"$@\" >> '{}'\nexit {exit_code}\n",
            self.log_path(name).display()
        );
        fs::write(&path, script)
            .unwrap_or_else(|e| panic!("FakeBin: failed to write {name}: {e}"));
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .unwrap_or_else(|e| panic!("FakeBin: failed to chmod {name}: {e}"));
        path
    }

    /// Recorded argument lines for `name`, empty if it never ran.
    pub fn calls(&self, name: &str) -> Vec<String> {
        fs::read_to_string(self.log_path(name))
            .map(|log| log.lines().map(ToString::to_string).collect())
            .unwrap_or_default()
    }
}
