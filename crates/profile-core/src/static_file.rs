//! Static configuration files written once if absent.
//!
//! The content is an opaque blob. An existing file is never overwritten,
//! whatever it holds, so local edits survive re-runs.

use profile_fs::{ProfilePath, RobustnessConfig, io};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Written,
    AlreadyPresent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFile {
    pub path: ProfilePath,
    pub content: String,
}

impl StaticFile {
    pub fn new(path: impl Into<ProfilePath>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Write the file unless something already exists at its path.
    pub fn ensure(&self, robustness: RobustnessConfig, dry_run: bool) -> Result<FileStatus> {
        if self.path.exists() {
            return Ok(FileStatus::AlreadyPresent);
        }
        if !dry_run {
            io::write_atomic(&self.path, self.content.as_bytes(), robustness)?;
            tracing::info!(path = %self.path, "wrote static file");
        }
        Ok(FileStatus::Written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".config").join("starship.toml");
        let file = StaticFile::new(path.clone(), "add_newline = false\n");

        assert_eq!(
            file.ensure(RobustnessConfig::default(), false).unwrap(),
            FileStatus::Written
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "add_newline = false\n");
    }

    #[test]
    fn test_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("starship.toml");
        std::fs::write(&path, "# user edited\n").unwrap();
        let file = StaticFile::new(path.clone(), "add_newline = false\n");

        assert_eq!(
            file.ensure(RobustnessConfig::default(), false).unwrap(),
            FileStatus::AlreadyPresent
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# user edited\n");
    }

    #[test]
    fn test_dry_run_reports_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("starship.toml");
        let file = StaticFile::new(path.clone(), "x");

        assert_eq!(
            file.ensure(RobustnessConfig::default(), true).unwrap(),
            FileStatus::Written
        );
        assert!(!path.exists());
    }
}
