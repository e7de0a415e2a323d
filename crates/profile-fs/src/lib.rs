//! Filesystem layer for the profile provisioner
//!
//! Provides explicit profile paths (with `~` expansion) and safe I/O:
//! lossless reads that treat a missing file as empty, and locked
//! write-to-temp-then-rename replacement.

pub mod error;
pub mod io;
pub mod path;

pub use error::{Error, Result};
pub use io::{FileLock, RobustnessConfig};
pub use path::{ProfilePath, expand_home};
