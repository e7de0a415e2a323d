//! Plan commands: apply and status

use std::path::Path;

use colored::{ColoredString, Colorize};
use profile_core::{
    CommandRunner, EntryState, Plan, ProvisionOptions, Provisioner, StepOutcome, StepReport,
    SystemRunner,
};
use profile_fs::ProfilePath;

use super::{print_diff, print_warnings};
use crate::error::Result;

/// Run the apply command with real subprocess collaborators
pub fn run_apply(
    plan: &Plan,
    profile: Option<ProfilePath>,
    dry_run: bool,
    skip_collaborators: bool,
    json: bool,
) -> Result<()> {
    let runner = SystemRunner::new();
    let options = ProvisionOptions {
        dry_run,
        skip_collaborators,
        profile_override: profile,
        ..ProvisionOptions::default()
    };
    apply_with(&Provisioner::new(plan, &runner, options)?, json)
}

pub(crate) fn apply_with(provisioner: &Provisioner<'_>, json: bool) -> Result<()> {
    if json {
        let report = provisioner.run()?;
        println!("{}", report.to_json()?);
        return Ok(());
    }

    let report = provisioner.run_with(print_step)?;

    println!();
    let changes = report.changes();
    if changes == 0 {
        println!("{} Already configured. No changes needed.", "OK".green().bold());
    } else if report.dry_run {
        println!(
            "{} {} step(s) would change {}. Nothing was written.",
            "DRY RUN".yellow().bold(),
            changes,
            report.profile.display()
        );
    } else {
        println!("{} {} step(s) applied.", "OK".green().bold(), changes);
    }
    Ok(())
}

fn outcome_label(outcome: StepOutcome) -> ColoredString {
    match outcome {
        StepOutcome::AlreadyPresent | StepOutcome::Skipped => outcome.as_str().dimmed(),
        StepOutcome::WouldRun => outcome.as_str().yellow(),
        _ => outcome.as_str().green(),
    }
}

fn print_step(step: &StepReport) {
    println!(
        "{:>10} {} {}",
        step.kind.as_str().bold(),
        step.name.cyan(),
        outcome_label(step.outcome)
    );
    print_warnings(&step.warnings);
    if let Some(diff) = &step.diff {
        print_diff(diff);
    }
}

/// Run the status command
pub fn run_status(plan: &Plan, profile: Option<ProfilePath>, json: bool) -> Result<()> {
    let runner = SystemRunner::new();
    let options = ProvisionOptions {
        profile_override: profile,
        ..ProvisionOptions::default()
    };
    status_with(plan, &runner, options, json)
}

fn status_with(
    plan: &Plan,
    runner: &dyn CommandRunner,
    options: ProvisionOptions,
    json: bool,
) -> Result<()> {
    let report = Provisioner::new(plan, runner, options)?.status()?;

    if json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    println!("{}", "Profile Status".bold());
    println!();
    println!("{}: {}", "Profile".dimmed(), report.profile.display());
    println!();

    for entry in &report.entries {
        let state = match entry.state {
            EntryState::Present => "present".green(),
            EntryState::Missing => "missing".yellow(),
            EntryState::Stale => "stale".red(),
        };
        println!(
            "{:>10} {} {}",
            entry.kind.as_str().bold(),
            entry.name.cyan(),
            state
        );
        print_warnings(&entry.warnings);
    }

    println!();
    if report.is_converged() {
        println!("{} Everything is configured.", "OK".green().bold());
    } else {
        println!("Run {} to converge.", "provision apply".cyan());
    }
    Ok(())
}
