//! Error types for profile-core

use std::path::PathBuf;

/// Result type for profile-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or running a plan
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Plan file not found at expected path
    #[error("Plan not found at {path}")]
    PlanNotFound { path: PathBuf },

    /// Plan file exists but is not a valid plan
    #[error("Failed to parse plan at {path}: {message}")]
    PlanParse { path: PathBuf, message: String },

    /// Plan parsed but declares something unusable
    #[error("Invalid plan: {message}")]
    PlanInvalid { message: String },

    /// A collaborator program is not on PATH
    #[error("{name}: program {program:?} not found on PATH")]
    CollaboratorMissing { name: String, program: String },

    /// A collaborator ran and reported failure
    #[error("{name} failed (exit code: {code:?})")]
    CollaboratorFailed { name: String, code: Option<i32> },

    // Transparent wrappers for underlying crate errors
    /// Profile edit error from profile-blocks
    #[error(transparent)]
    Blocks(#[from] profile_blocks::Error),

    /// Filesystem error from profile-fs
    #[error(transparent)]
    Fs(#[from] profile_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
