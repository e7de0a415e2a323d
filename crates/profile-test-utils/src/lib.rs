//! Shared test utilities for the profile-provisioner workspace.
//!
//! Dev-dependency only. Never published.
//!
//! # Modules
//!
//! - [`profile`]: [`profile::TestProfile`], a throwaway home directory with a profile file
//! - [`bin`]: [`bin::FakeBin`], executables on a private `PATH` that record their calls

pub mod bin;
pub mod profile;
