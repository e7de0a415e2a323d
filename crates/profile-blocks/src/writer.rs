//! Pure content edits for managed blocks and directive lines.
//!
//! Each function takes the current text and returns an [`Edit`] holding
//! the text before and after. Nothing here touches the filesystem; see
//! [`crate::resource`] for the read-modify-write cycle.

use std::fmt;

use similar::TextDiff;

use crate::error::{Error, Result};
use crate::marker::{self, BlockSpec, MarkerCollision, scan_markers};
use crate::pattern::LinePattern;

/// Result of [`apply_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    Created,
    AlreadyPresent,
}

/// Result of [`apply_line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    Appended,
    AlreadyPresent,
}

/// Result of [`strip_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveStatus {
    Removed,
    NotPresent,
}

impl BlockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::AlreadyPresent => "already-present",
        }
    }
}

impl LineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Appended => "appended",
            Self::AlreadyPresent => "already-present",
        }
    }
}

impl RemoveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Removed => "removed",
            Self::NotPresent => "not-present",
        }
    }
}

impl fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RemoveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A computed change to a profile's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit<S> {
    pub status: S,
    pub before: String,
    pub after: String,
    pub collisions: Vec<MarkerCollision>,
}

impl<S> Edit<S> {
    fn unchanged(status: S, content: &str, collisions: Vec<MarkerCollision>) -> Self {
        Self {
            status,
            before: content.to_string(),
            after: content.to_string(),
            collisions,
        }
    }

    pub fn has_changes(&self) -> bool {
        self.before != self.after
    }

    /// Unified diff of the edit, labelled with `name`. Empty when unchanged.
    pub fn diff_preview(&self, name: &str) -> String {
        if !self.has_changes() {
            return String::new();
        }
        TextDiff::from_lines(&self.before, &self.after)
            .unified_diff()
            .context_radius(2)
            .header(&format!("a/{name}"), &format!("b/{name}"))
            .to_string()
    }
}

/// Line terminator to use when appending: CRLF if the file already uses it.
fn newline_of(content: &str) -> &'static str {
    if content.contains("\r\n") { "\r\n" } else { "\n" }
}

/// Copy of `content` that is either empty or ends with a line terminator.
fn with_terminated_last_line(content: &str, nl: &str) -> String {
    let mut out = content.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push_str(nl);
    }
    out
}

/// Ensure a block opened by `spec.start` exists.
///
/// When the start marker is already present the content is returned
/// untouched: an installed body is never refreshed, even if it differs from
/// `spec.body`. Otherwise a blank separator line, the start marker, the body
/// and the end marker are appended.
///
/// # Errors
/// Returns [`Error::InvalidMarker`] if the spec's markers are unusable.
pub fn apply_block(content: &str, spec: &BlockSpec) -> Result<Edit<BlockStatus>> {
    spec.validate()?;
    let collisions = scan_markers(content, &spec.start, &spec.end);

    if marker::has_start_marker(content, &spec.start) {
        return Ok(Edit::unchanged(BlockStatus::AlreadyPresent, content, collisions));
    }

    let nl = newline_of(content);
    let mut after = with_terminated_last_line(content, nl);
    after.push_str(nl);
    after.push_str(&spec.start);
    after.push_str(nl);
    for line in &spec.body {
        after.push_str(line);
        after.push_str(nl);
    }
    after.push_str(&spec.end);
    after.push_str(nl);

    Ok(Edit {
        status: BlockStatus::Created,
        before: content.to_string(),
        after,
        collisions,
    })
}

/// Ensure some line matches `pattern`, appending `line` if none does.
///
/// # Errors
/// Returns [`Error::InvalidDirective`] if `line` is empty, spans lines, or
/// is not itself matched by `pattern` (it would be appended on every run).
pub fn apply_line(content: &str, pattern: &LinePattern, line: &str) -> Result<Edit<LineStatus>> {
    if line.trim().is_empty() {
        return Err(Error::InvalidDirective {
            reason: "directive line must not be blank".to_string(),
        });
    }
    if line.contains('\n') || line.contains('\r') {
        return Err(Error::InvalidDirective {
            reason: "directive must be a single line".to_string(),
        });
    }
    if !pattern.matches(line) {
        return Err(Error::InvalidDirective {
            reason: format!("directive {line:?} does not match its own pattern {:?}", pattern.as_str()),
        });
    }

    if pattern.find_in(content).is_some() {
        return Ok(Edit::unchanged(LineStatus::AlreadyPresent, content, Vec::new()));
    }

    let nl = newline_of(content);
    let mut after = with_terminated_last_line(content, nl);
    after.push_str(line);
    after.push_str(nl);

    Ok(Edit {
        status: LineStatus::Appended,
        before: content.to_string(),
        after,
        collisions: Vec::new(),
    })
}

/// Remove the first block opened by `start`, plus the blank separator line
/// directly above it.
///
/// Bytes outside the removed lines are kept exactly, including their line
/// terminators.
///
/// # Errors
/// Returns [`Error::UnterminatedBlock`] when no end marker follows the
/// start marker, rather than deleting to the end of the file.
pub fn strip_block(content: &str, start: &str, end: &str) -> Result<Edit<RemoveStatus>> {
    marker::validate_markers(start, end)?;
    let collisions = scan_markers(content, start, end);

    let segments: Vec<&str> = content.split_inclusive('\n').collect();
    let bare = |segment: &str| -> String {
        segment
            .strip_suffix('\n')
            .map(|s| s.strip_suffix('\r').unwrap_or(s))
            .unwrap_or(segment)
            .to_string()
    };

    let Some(open) = segments.iter().position(|s| bare(s) == start) else {
        return Ok(Edit::unchanged(RemoveStatus::NotPresent, content, collisions));
    };
    let close = segments[open + 1..]
        .iter()
        .position(|s| bare(s) == end)
        .map(|offset| open + 1 + offset)
        .ok_or_else(|| Error::UnterminatedBlock {
            start: start.to_string(),
            line: open + 1,
        })?;

    let first = if open > 0 && bare(segments[open - 1]).trim().is_empty() {
        open - 1
    } else {
        open
    };

    let after: String = segments[..first]
        .iter()
        .chain(segments[close + 1..].iter())
        .copied()
        .collect();

    Ok(Edit {
        status: RemoveStatus::Removed,
        before: content.to_string(),
        after,
        collisions,
    })
}
