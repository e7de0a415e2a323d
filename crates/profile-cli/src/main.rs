//! Shell profile provisioning CLI
//!
//! Installs packages and vendor tools, writes static config files, and keeps
//! managed blocks and directive lines in a shell profile, converging on
//! every run.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    tracing::debug!("Verbose mode enabled");

    execute_command(cli.command)
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Apply {
            plan,
            profile,
            dry_run,
            skip_collaborators,
            json,
        } => {
            let plan = commands::load_plan(plan.plan.as_deref())?;
            let profile = commands::profile_override(profile.profile.as_deref())?;
            commands::run_apply(&plan, profile, dry_run, skip_collaborators, json)
        }
        Commands::Status {
            plan,
            profile,
            json,
        } => {
            let plan = commands::load_plan(plan.plan.as_deref())?;
            let profile = commands::profile_override(profile.profile.as_deref())?;
            commands::run_status(&plan, profile, json)
        }
        Commands::EnsureBlock {
            id,
            start,
            end,
            body,
            body_file,
            profile,
            dry_run,
        } => commands::run_ensure_block(
            commands::resolve_profile(profile.profile.as_deref())?,
            &id,
            &start,
            &end,
            &body,
            body_file.as_deref(),
            dry_run,
        ),
        Commands::EnsureLine {
            pattern,
            line,
            regex,
            profile,
            dry_run,
        } => commands::run_ensure_line(
            commands::resolve_profile(profile.profile.as_deref())?,
            &pattern,
            &line,
            regex,
            dry_run,
        ),
        Commands::RemoveBlock {
            start,
            end,
            profile,
            dry_run,
        } => commands::run_remove_block(
            commands::resolve_profile(profile.profile.as_deref())?,
            &start,
            &end,
            dry_run,
        ),
    }
}
