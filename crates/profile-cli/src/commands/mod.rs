//! Command implementations

mod edit;
mod plan;

use std::path::{Path, PathBuf};

use colored::Colorize;
use profile_core::Plan;
use profile_fs::ProfilePath;

use crate::error::{CliError, Result};

pub use edit::{run_ensure_block, run_ensure_line, run_remove_block};
pub use plan::{run_apply, run_status};

/// An explicit `--profile`, with `~` expanded.
pub fn profile_override(raw: Option<&str>) -> Result<Option<ProfilePath>> {
    Ok(raw.map(ProfilePath::parse).transpose()?)
}

/// An explicit `--profile`, else `~/.bashrc`.
pub fn resolve_profile(raw: Option<&str>) -> Result<ProfilePath> {
    match profile_override(raw)? {
        Some(path) => Ok(path),
        None => Ok(ProfilePath::default_profile()?),
    }
}

/// Load the plan from `--plan`, else the default location.
pub fn load_plan(path: Option<&Path>) -> Result<Plan> {
    let path: PathBuf = match path {
        Some(path) => path.to_path_buf(),
        None => Plan::default_location().ok_or_else(|| {
            CliError::user("could not determine the config directory; pass --plan")
        })?,
    };
    Ok(Plan::load(&path)?)
}

fn print_warnings<S: AsRef<str>>(warnings: &[S]) {
    for warning in warnings {
        println!("   {} {}", "warning:".yellow().bold(), warning.as_ref());
    }
}

fn print_diff(diff: &str) {
    for line in diff.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else {
            println!("{line}");
        }
    }
}
