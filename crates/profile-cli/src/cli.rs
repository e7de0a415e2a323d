//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Provision a shell profile: packages, vendor installers, static files,
/// managed blocks and directive lines, all safe to re-run.
#[derive(Parser, Debug)]
#[command(name = "provision")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Profile file to edit.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ProfileArg {
    /// Shell profile to edit (default: the plan's profile, else ~/.bashrc)
    #[arg(long, env = "PROVISION_PROFILE")]
    pub profile: Option<String>,
}

/// Plan file to run.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PlanArg {
    /// Plan file (default: <config dir>/provision/plan.toml)
    #[arg(long, env = "PROVISION_PLAN")]
    pub plan: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run every step of a plan
    ///
    /// Examples:
    ///   provision apply
    ///   provision apply --dry-run
    ///   provision apply --skip-collaborators --profile ~/.bashrc.test
    Apply {
        #[command(flatten)]
        plan: PlanArg,

        #[command(flatten)]
        profile: ProfileArg,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Only write files, blocks and lines; run no installers
        #[arg(long)]
        skip_collaborators: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show which plan entries are present, missing or stale
    Status {
        #[command(flatten)]
        plan: PlanArg,

        #[command(flatten)]
        profile: ProfileArg,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Append a marker-delimited block unless its start marker is present
    EnsureBlock {
        /// Name used in output
        #[arg(long)]
        id: String,

        /// Start marker line
        #[arg(long)]
        start: String,

        /// End marker line
        #[arg(long)]
        end: String,

        /// Body line (repeatable)
        #[arg(long = "body", conflicts_with = "body_file")]
        body: Vec<String>,

        /// Read the body from a file
        #[arg(long)]
        body_file: Option<PathBuf>,

        #[command(flatten)]
        profile: ProfileArg,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Append a directive line unless a line already matches the pattern
    EnsureLine {
        /// Text that identifies an existing directive
        #[arg(long)]
        pattern: String,

        /// Line to append when nothing matches
        #[arg(long)]
        line: String,

        /// Treat the pattern as a regular expression
        #[arg(long)]
        regex: bool,

        #[command(flatten)]
        profile: ProfileArg,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete a managed block and its markers
    RemoveBlock {
        /// Start marker line
        #[arg(long)]
        start: String,

        /// End marker line
        #[arg(long)]
        end: String,

        #[command(flatten)]
        profile: ProfileArg,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },
}
