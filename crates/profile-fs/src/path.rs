//! Explicit profile paths with home-directory expansion

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Shell startup file used when the caller names none.
pub const DEFAULT_PROFILE: &str = ".bashrc";

/// Expand a leading `~` or `~/` against `home`.
///
/// Any other input (including `~user/...`) is returned unchanged.
pub fn expand_home(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        home.to_path_buf()
    } else if let Some(rest) = raw.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(raw)
    }
}

/// The location of a text resource managed by this tool.
///
/// A `ProfilePath` is always passed explicitly into every operation so
/// tests can point at temporary files instead of real user profiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProfilePath {
    inner: PathBuf,
}

impl ProfilePath {
    /// Wrap an already-resolved path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { inner: path.into() }
    }

    /// Parse a user-supplied path, expanding a leading `~`.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw == "~" || raw.starts_with("~/") {
            let home = dirs::home_dir().ok_or(Error::HomeNotFound)?;
            Ok(Self::new(expand_home(raw, &home)))
        } else {
            Ok(Self::new(raw))
        }
    }

    /// The invoking user's `~/.bashrc`.
    pub fn default_profile() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::HomeNotFound)?;
        Ok(Self::new(home.join(DEFAULT_PROFILE)))
    }

    pub fn as_path(&self) -> &Path {
        &self.inner
    }

    pub fn to_path_buf(&self) -> PathBuf {
        self.inner.clone()
    }

    pub fn exists(&self) -> bool {
        self.inner.exists()
    }

    /// The file name component as UTF-8, lossily.
    pub fn file_name(&self) -> String {
        self.inner
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The file that is actually rewritten.
    ///
    /// Dotfile managers commonly symlink `~/.bashrc` into a repository;
    /// replacing the link itself would silently detach it, so a symlinked
    /// path resolves to its target.
    pub fn write_target(&self) -> Result<PathBuf> {
        match std::fs::symlink_metadata(&self.inner) {
            Ok(meta) if meta.file_type().is_symlink() => {
                dunce::canonicalize(&self.inner).map_err(|e| Error::io(&self.inner, e))
            }
            _ => Ok(self.inner.clone()),
        }
    }

    /// Sidecar file used for advisory locking: `<dir>/<name>.lock`.
    pub fn lock_path(&self) -> PathBuf {
        let name = format!("{}.lock", self.file_name());
        self.inner.with_file_name(name)
    }
}

impl AsRef<Path> for ProfilePath {
    fn as_ref(&self) -> &Path {
        &self.inner
    }
}

impl std::fmt::Display for ProfilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner.display())
    }
}

impl From<&str> for ProfilePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for ProfilePath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for ProfilePath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
