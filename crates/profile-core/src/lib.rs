//! Provisioning plans, collaborators and the provisioning runner.
//!
//! A [`Plan`] declares packages to install, vendor installers to run,
//! static files to write once, and the managed blocks and directive lines
//! a shell profile should carry. [`Provisioner`] applies it in order and
//! can be re-run safely: every profile step converges, static files are
//! never overwritten, and installers whose binary is already on PATH are
//! skipped.

pub mod collaborator;
pub mod error;
pub mod plan;
pub mod provision;
pub mod static_file;

pub use collaborator::{
    CommandRunner, ExitOutcome, InstallerStatus, Invocation, PackageManager, SystemRunner,
    VendorInstaller,
};
pub use error::{Error, Result};
pub use plan::{
    BlockSection, FileSection, InstallerSection, LineSection, PackagesSection, Plan,
    ProfileSection,
};
pub use provision::{
    EntryState, ProvisionOptions, ProvisionReport, Provisioner, StatusEntry, StatusReport,
    StepKind, StepOutcome, StepReport,
};
pub use static_file::{FileStatus, StaticFile};
