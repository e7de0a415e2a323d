//! Error types for profile-blocks

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Existing content could not be read (permissions, encoding)
    #[error("Cannot read {path}: {source}")]
    ResourceUnreadable {
        path: PathBuf,
        #[source]
        source: profile_fs::Error,
    },

    /// The resource could not be locked or written
    #[error("Cannot write {path}: {source}")]
    ResourceUnwritable {
        path: PathBuf,
        #[source]
        source: profile_fs::Error,
    },

    #[error("Invalid block markers: {reason}")]
    InvalidMarker { reason: String },

    #[error("Invalid directive: {reason}")]
    InvalidDirective { reason: String },

    #[error("Invalid line pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A start marker with no end marker after it; removal would eat the file tail
    #[error("Block starting with {start:?} at line {line} has no end marker")]
    UnterminatedBlock { start: String, line: usize },
}
