//! Error types for profile-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from profile-core
    #[error(transparent)]
    Core(#[from] profile_core::Error),

    /// Error from profile-blocks
    #[error(transparent)]
    Blocks(#[from] profile_blocks::Error),

    /// Error from profile-fs
    #[error(transparent)]
    Fs(#[from] profile_fs::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
