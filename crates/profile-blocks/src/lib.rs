//! Idempotent managed blocks and directive lines for shell profiles.
//!
//! Two primitives keep a profile converged no matter how often they run:
//!
//! - **Managed blocks**: a body delimited by caller-chosen marker lines,
//!   appended once and never duplicated. Content outside the markers is
//!   never modified, reordered or removed.
//!
//!   ```text
//!   # >>> provision:aliases >>>
//!   alias ll='ls -alF'
//!   # <<< provision:aliases <<<
//!   ```
//!
//! - **Directive lines**: a single line that must exist somewhere, keyed on
//!   a tolerant pattern so an equivalent line written by another installer
//!   counts as present.
//!
//! The [`writer`] module holds the pure text transformations;
//! [`ProfileResource`] wraps them in a locked, atomic read-modify-write.
//!
//! ```
//! use profile_blocks::{BlockSpec, BlockStatus, writer::apply_block};
//!
//! let spec = BlockSpec::new("env", "# START_A", "# END_A", ["export X=1"]);
//! let first = apply_block("", &spec).unwrap();
//! assert_eq!(first.status, BlockStatus::Created);
//!
//! let second = apply_block(&first.after, &spec).unwrap();
//! assert_eq!(second.status, BlockStatus::AlreadyPresent);
//! assert_eq!(second.after, first.after);
//! ```

pub mod error;
pub mod marker;
pub mod pattern;
pub mod resource;
pub mod writer;

pub use error::{Error, Result};
pub use marker::{BlockSpec, InstalledBlock, MarkerCollision, find_block, scan_markers};
pub use pattern::LinePattern;
pub use resource::{BlockInspection, ProfileResource};
pub use writer::{BlockStatus, Edit, LineStatus, RemoveStatus};
