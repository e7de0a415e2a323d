//! Marker-delimited block scanning.
//!
//! A managed block is a region of a profile delimited by two marker lines
//! that must match exactly (a trailing `\r` is ignored):
//! ```text
//! # >>> provision:aliases >>>
//! alias ll='ls -alF'
//! # <<< provision:aliases <<<
//! ```
//! Markers are chosen by the caller; this module only locates them and
//! reports suspicious layouts as [`MarkerCollision`] warnings.

use std::fmt;

use crate::error::{Error, Result};

/// The caller's declaration of a block that should exist in a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpec {
    /// Human-readable identity used in logs and reports.
    pub id: String,
    pub start: String,
    pub end: String,
    pub body: Vec<String>,
}

impl BlockSpec {
    pub fn new(
        id: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
        body: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            start: start.into(),
            end: end.into(),
            body: body.into_iter().map(Into::into).collect(),
        }
    }

    /// Check that the markers can delimit a block unambiguously.
    ///
    /// # Errors
    /// Returns [`Error::InvalidMarker`] for empty, multi-line or identical
    /// markers, a multi-line body entry, or a body line that repeats a marker.
    pub fn validate(&self) -> Result<()> {
        validate_markers(&self.start, &self.end)?;

        for (idx, line) in self.body.iter().enumerate() {
            let reason = if line.contains('\n') || line.contains('\r') {
                "spans several lines; give each line its own entry"
            } else if *line == self.start || *line == self.end {
                "repeats a marker"
            } else {
                continue;
            };
            return Err(Error::InvalidMarker {
                reason: format!("body line {} of block {:?} {reason}", idx + 1, self.id),
            });
        }
        Ok(())
    }
}

pub(crate) fn validate_markers(start: &str, end: &str) -> Result<()> {
    let reason = if start.trim().is_empty() || end.trim().is_empty() {
        Some("markers must not be blank")
    } else if start.contains('\n') || end.contains('\n') || start.contains('\r') || end.contains('\r') {
        Some("markers must be single lines")
    } else if start == end {
        Some("start and end markers must differ")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidMarker {
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// A heuristic sign that a marker also occurs in content this tool did not write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerCollision {
    /// The start marker appears on more than one line (1-based).
    DuplicateStart { lines: Vec<usize> },
    /// A start marker with no end marker after it.
    Unterminated { line: usize },
    /// An end marker with no start marker before it.
    OrphanEnd { line: usize },
    /// A line that contains a marker but is not exactly equal to it.
    Embedded { line: usize },
}

impl fmt::Display for MarkerCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateStart { lines } => {
                let lines: Vec<String> = lines.iter().map(ToString::to_string).collect();
                write!(f, "start marker appears on lines {}", lines.join(", "))
            }
            Self::Unterminated { line } => {
                write!(f, "start marker on line {line} has no end marker")
            }
            Self::OrphanEnd { line } => {
                write!(f, "end marker on line {line} has no start marker")
            }
            Self::Embedded { line } => {
                write!(f, "line {line} contains a marker inside other text")
            }
        }
    }
}

/// Scan `content` for layouts that suggest a marker collides with foreign text.
pub fn scan_markers(content: &str, start: &str, end: &str) -> Vec<MarkerCollision> {
    let mut collisions = Vec::new();
    let mut starts = Vec::new();
    let mut open: Option<usize> = None;

    for (idx, line) in content.lines().enumerate() {
        let number = idx + 1;
        if line == start {
            starts.push(number);
            open = Some(number);
        } else if line == end {
            if open.take().is_none() {
                collisions.push(MarkerCollision::OrphanEnd { line: number });
            }
        } else if line.contains(start) || line.contains(end) {
            collisions.push(MarkerCollision::Embedded { line: number });
        }
    }

    if let Some(line) = open {
        collisions.push(MarkerCollision::Unterminated { line });
    }
    if starts.len() > 1 {
        collisions.push(MarkerCollision::DuplicateStart { lines: starts });
    }

    collisions
}

/// A block found in existing content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledBlock {
    /// 1-based line of the start marker.
    pub start_line: usize,
    /// 1-based line of the end marker, if one follows.
    pub end_line: Option<usize>,
    /// Lines strictly between the markers (to end of file when unterminated).
    pub body: Vec<String>,
}

/// Locate the first block opened by `start`.
pub fn find_block(content: &str, start: &str, end: &str) -> Option<InstalledBlock> {
    let lines: Vec<&str> = content.lines().collect();
    let open = lines.iter().position(|l| *l == start)?;
    let close = lines[open + 1..]
        .iter()
        .position(|l| *l == end)
        .map(|offset| open + 1 + offset);

    let body_end = close.unwrap_or(lines.len());
    Some(InstalledBlock {
        start_line: open + 1,
        end_line: close.map(|c| c + 1),
        body: lines[open + 1..body_end].iter().map(ToString::to_string).collect(),
    })
}

/// Whether a line exactly equal to `start` exists.
pub fn has_start_marker(content: &str, start: &str) -> bool {
    content.lines().any(|l| l == start)
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "# >>> test >>>";
    const END: &str = "# <<< test <<<";

    #[test]
    fn test_validate_rejects_identical_markers() {
        let spec = BlockSpec::new("a", "# m", "# m", ["x"]);
        assert!(matches!(spec.validate(), Err(Error::InvalidMarker { .. })));
    }

    #[test]
    fn test_validate_rejects_blank_marker() {
        let spec = BlockSpec::new("a", "  ", "# end", ["x"]);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_multi_line_body_entry() {
        let spec = BlockSpec::new("a", START, END, ["echo one\necho two"]);
        assert!(matches!(spec.validate(), Err(Error::InvalidMarker { .. })));
        let spec = BlockSpec::new("a", START, END, ["echo one\r"]);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_marker_in_body() {
        let spec = BlockSpec::new("a", START, END, ["echo hi", END]);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_empty_body() {
        let spec = BlockSpec::new("a", START, END, Vec::<String>::new());
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_scan_clean_block() {
        let content = format!("alias a=b\n\n{START}\nx\n{END}\n");
        assert!(scan_markers(&content, START, END).is_empty());
    }

    #[test]
    fn test_scan_embedded_marker() {
        let content = format!("echo '{START}'\n");
        assert_eq!(
            scan_markers(&content, START, END),
            vec![MarkerCollision::Embedded { line: 1 }]
        );
    }

    #[test]
    fn test_scan_unterminated_and_orphan() {
        let content = format!("{END}\n{START}\nbody\n");
        assert_eq!(
            scan_markers(&content, START, END),
            vec![
                MarkerCollision::OrphanEnd { line: 1 },
                MarkerCollision::Unterminated { line: 2 },
            ]
        );
    }

    #[test]
    fn test_scan_duplicate_start() {
        let content = format!("{START}\n{END}\n{START}\n{END}\n");
        assert_eq!(
            scan_markers(&content, START, END),
            vec![MarkerCollision::DuplicateStart { lines: vec![1, 3] }]
        );
    }

    #[test]
    fn test_find_block_body() {
        let content = format!("before\n{START}\none\ntwo\n{END}\nafter\n");
        let block = find_block(&content, START, END).unwrap();
        assert_eq!(block.start_line, 2);
        assert_eq!(block.end_line, Some(5));
        assert_eq!(block.body, vec!["one", "two"]);
    }

    #[test]
    fn test_find_block_crlf() {
        let content = format!("{START}\r\nx\r\n{END}\r\n");
        let block = find_block(&content, START, END).unwrap();
        assert_eq!(block.body, vec!["x"]);
    }

    #[test]
    fn test_find_block_absent() {
        assert!(find_block("nothing here", START, END).is_none());
    }
}
