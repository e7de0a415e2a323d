//! [`TestProfile`] fixture for profile-editing scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary home directory holding a `.bashrc`.
///
/// # Example
///
/// ```rust,no_run
/// use profile_test_utils::profile::TestProfile;
///
/// let profile = TestProfile::with_content("alias foo=bar\n");
/// assert_eq!(profile.content(), "alias foo=bar\n");
/// ```
pub struct TestProfile {
    temp_dir: TempDir,
    path: PathBuf,
}

impl Default for TestProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProfile {
    /// A home directory whose `.bashrc` does not exist yet.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".bashrc");
        Self { temp_dir, path }
    }

    /// A home directory whose `.bashrc` holds `content`.
    pub fn with_content(content: &str) -> Self {
        let profile = Self::new();
        fs::write(&profile.path, content)
            .unwrap_or_else(|e| panic!("TestProfile: failed to write .bashrc: {e}"));
        profile
    }

    pub fn home(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current `.bashrc` contents.
    ///
    /// # Panics
    /// Panics if the file does not exist.
    pub fn content(&self) -> String {
        fs::read_to_string(&self.path)
            .unwrap_or_else(|e| panic!("TestProfile: failed to read .bashrc: {e}"))
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Assert `needle` occurs exactly `expected` times in the profile.
    pub fn assert_occurrences(&self, needle: &str, expected: usize) {
        let content = self.content();
        let found = content.matches(needle).count();
        assert_eq!(
            found, expected,
            "expected {expected} occurrence(s) of {needle:?}, found {found} in:\n{content}"
        );
    }
}
