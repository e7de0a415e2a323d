//! Read-modify-write of a profile on disk.

use std::path::PathBuf;

use profile_fs::{FileLock, ProfilePath, RobustnessConfig, io};

use crate::error::{Error, Result};
use crate::marker::{BlockSpec, MarkerCollision, find_block, scan_markers};
use crate::pattern::LinePattern;
use crate::writer::{self, BlockStatus, Edit, LineStatus, RemoveStatus};

/// What [`ProfileResource::inspect_block`] found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInspection {
    pub present: bool,
    /// The installed body differs from the declared one. Never auto-fixed.
    pub stale: bool,
    pub installed_body: Option<Vec<String>>,
    pub collisions: Vec<MarkerCollision>,
}

/// A shell profile (or any line-oriented text file) managed by this tool.
///
/// Every operation is a fresh read-modify-write cycle; the file is the
/// only state. A missing file reads as empty and is created by the first
/// write.
#[derive(Debug, Clone)]
pub struct ProfileResource {
    path: ProfilePath,
    robustness: RobustnessConfig,
    dry_run: bool,
}

impl ProfileResource {
    pub fn new(path: impl Into<ProfilePath>) -> Self {
        Self {
            path: path.into(),
            robustness: RobustnessConfig::default(),
            dry_run: false,
        }
    }

    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.robustness = robustness;
        self
    }

    /// Compute edits without writing them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn path(&self) -> &ProfilePath {
        &self.path
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Current contents, empty if the file does not exist.
    ///
    /// # Errors
    /// Returns [`Error::ResourceUnreadable`] on permission or encoding errors.
    pub fn read(&self) -> Result<String> {
        io::read_text_or_empty(&self.path).map_err(|source| Error::ResourceUnreadable {
            path: self.path.to_path_buf(),
            source,
        })
    }

    /// Make `spec` present exactly once. See [`writer::apply_block`].
    pub fn ensure_block(&self, spec: &BlockSpec) -> Result<Edit<BlockStatus>> {
        let edit = self.commit(|content| writer::apply_block(content, spec))?;
        report_collisions(&self.path, &spec.id, &edit.collisions);
        tracing::info!(
            path = %self.path,
            block = %spec.id,
            status = %edit.status,
            dry_run = self.dry_run,
            "ensure block"
        );
        Ok(edit)
    }

    /// Make some line match `pattern`, appending `line` if none does.
    pub fn ensure_line(&self, pattern: &LinePattern, line: &str) -> Result<Edit<LineStatus>> {
        let edit = self.commit(|content| writer::apply_line(content, pattern, line))?;
        tracing::info!(
            path = %self.path,
            pattern = pattern.as_str(),
            status = %edit.status,
            dry_run = self.dry_run,
            "ensure line"
        );
        Ok(edit)
    }

    /// Remove the block opened by `start`. See [`writer::strip_block`].
    pub fn remove_block(&self, start: &str, end: &str) -> Result<Edit<RemoveStatus>> {
        let edit = self.commit(|content| writer::strip_block(content, start, end))?;
        tracing::info!(
            path = %self.path,
            marker = start,
            status = %edit.status,
            dry_run = self.dry_run,
            "remove block"
        );
        Ok(edit)
    }

    /// Read-only check of a declared block.
    pub fn inspect_block(&self, spec: &BlockSpec) -> Result<BlockInspection> {
        spec.validate()?;
        let content = self.read()?;
        let collisions = scan_markers(&content, &spec.start, &spec.end);
        let installed = find_block(&content, &spec.start, &spec.end);

        let stale = installed.as_ref().is_some_and(|block| {
            block.end_line.is_none() || block.body != spec.body
        });
        if stale {
            tracing::warn!(
                path = %self.path,
                block = %spec.id,
                "installed block body differs from declaration; remove it and re-run to refresh"
            );
        }

        Ok(BlockInspection {
            present: installed.is_some(),
            stale,
            installed_body: installed.map(|b| b.body),
            collisions,
        })
    }

    /// 1-based line number of the first line matching `pattern`.
    pub fn inspect_line(&self, pattern: &LinePattern) -> Result<Option<usize>> {
        Ok(pattern.find_in(&self.read()?))
    }

    /// Run `compute` against current content and persist the result.
    ///
    /// An unlocked first pass settles the common no-op case without
    /// creating a lock file. When a change is needed the lock is taken and
    /// the edit recomputed against freshly read content, so a concurrent
    /// writer cannot make both sides append.
    fn commit<S>(&self, compute: impl Fn(&str) -> Result<Edit<S>>) -> Result<Edit<S>> {
        let edit = compute(&self.read()?)?;
        if !edit.has_changes() || self.dry_run {
            return Ok(edit);
        }

        let _lock = FileLock::acquire(&self.path, self.robustness)
            .map_err(|source| self.unwritable(source))?;

        let edit = compute(&self.read()?)?;
        if edit.has_changes() {
            io::replace_contents(&self.path, edit.after.as_bytes(), self.robustness)
                .map_err(|source| self.unwritable(source))?;
        }
        Ok(edit)
    }

    fn unwritable(&self, source: profile_fs::Error) -> Error {
        Error::ResourceUnwritable {
            path: self.path.to_path_buf(),
            source,
        }
    }
}

fn report_collisions(path: &ProfilePath, id: &str, collisions: &[MarkerCollision]) {
    for collision in collisions {
        tracing::warn!(path = %path, block = id, "marker collision: {collision}");
    }
}

impl From<PathBuf> for ProfileResource {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}
