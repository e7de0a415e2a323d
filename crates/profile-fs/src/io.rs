//! Atomic I/O operations with file locking

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::time::Duration;

use backoff::ExponentialBackoff;
use fs2::FileExt;

use crate::{Error, ProfilePath, Result};

/// Tuning for locked writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobustnessConfig {
    /// How long to keep retrying a contended lock before giving up.
    pub lock_timeout: Duration,
    /// Whether to fsync the temporary file before renaming it into place.
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            enable_fsync: true,
        }
    }
}

/// An exclusive advisory lock on a profile's sidecar `.lock` file.
///
/// Released when dropped. The sidecar is left on disk: unlinking it while
/// another process waits on the old inode would let two writers in at once.
#[derive(Debug)]
pub struct FileLock {
    file: File,
}

impl FileLock {
    /// Acquire the lock for `target`, retrying with exponential backoff
    /// until `robustness.lock_timeout` elapses.
    pub fn acquire(target: &ProfilePath, robustness: RobustnessConfig) -> Result<Self> {
        let lock_path = target.lock_path();
        ensure_parent(&lock_path)?;

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| Error::io(&lock_path, e))?;

        let policy = ExponentialBackoff {
            initial_interval: Duration::from_millis(10),
            max_interval: Duration::from_millis(250),
            max_elapsed_time: Some(robustness.lock_timeout),
            ..ExponentialBackoff::default()
        };

        backoff::retry(policy, || {
            file.try_lock_exclusive().map_err(|e| {
                if e.kind() == ErrorKind::WouldBlock {
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        })
        .map_err(|_| Error::LockFailed {
            path: target.to_path_buf(),
        })?;

        tracing::debug!(lock = %lock_path.display(), "acquired profile lock");
        Ok(Self { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Read a text resource, treating a missing file as empty.
///
/// Invalid UTF-8 is an error rather than being replaced, so content is
/// never silently rewritten.
pub fn read_text_or_empty(path: &ProfilePath) -> Result<String> {
    match fs::read_to_string(path.as_path()) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(Error::io(path.as_path(), e)),
    }
}

/// Replace the file's contents via write-to-temp-then-rename.
///
/// The caller is expected to hold the [`FileLock`]. The temporary file
/// lives in the same directory so the rename stays on one filesystem, and
/// it inherits the original file's permissions.
pub fn replace_contents(
    path: &ProfilePath,
    content: &[u8],
    robustness: RobustnessConfig,
) -> Result<()> {
    let target = path.write_target()?;
    ensure_parent(&target)?;

    let temp_name = format!(
        ".{}.{}.tmp",
        target
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = target.with_file_name(&temp_name);

    let result = write_then_rename(&target, &temp_path, content, robustness);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_then_rename(
    target: &Path,
    temp_path: &Path,
    content: &[u8],
    robustness: RobustnessConfig,
) -> Result<()> {
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;

    if robustness.enable_fsync {
        temp_file.sync_all().map_err(|e| Error::io(temp_path, e))?;
    }
    drop(temp_file);

    if let Ok(meta) = fs::metadata(target) {
        fs::set_permissions(temp_path, meta.permissions()).map_err(|e| Error::io(temp_path, e))?;
    }

    fs::rename(temp_path, target).map_err(|e| Error::io(target, e))?;
    tracing::debug!(path = %target.display(), bytes = content.len(), "replaced file contents");
    Ok(())
}

/// Lock, then replace the file's contents atomically.
pub fn write_atomic(
    path: &ProfilePath,
    content: &[u8],
    robustness: RobustnessConfig,
) -> Result<()> {
    let _lock = FileLock::acquire(path, robustness)?;
    replace_contents(path, content, robustness)
}
