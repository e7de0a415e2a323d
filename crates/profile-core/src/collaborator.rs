//! External collaborators: the package manager and vendor installers.
//!
//! Both are opaque programs with a pass/fail contract. Nothing is retried
//! and nothing is rolled back; a failure stops the run, and re-running is
//! safe because every other step is idempotent.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};
use crate::plan::{InstallerSection, PackagesSection};

/// Something to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// A program looked up on PATH, with arguments.
    Program { program: String, args: Vec<String> },
    /// An opaque script handed to `sh -c`.
    Shell { script: String },
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Program { program, args } if args.is_empty() => write!(f, "{program}"),
            Self::Program { program, args } => write!(f, "{} {}", program, args.join(" ")),
            Self::Shell { script } => write!(f, "sh -c {script:?}"),
        }
    }
}

/// How a finished invocation exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    pub success: bool,
    pub code: Option<i32>,
}

/// Runs collaborator invocations. Tests substitute a recording fake.
pub trait CommandRunner {
    /// Execute `invocation` on behalf of the collaborator called `name`.
    fn run(&self, name: &str, invocation: &Invocation) -> Result<ExitOutcome>;

    /// Whether `binary` is on PATH (the `command -v` check).
    fn is_installed(&self, binary: &str) -> bool;
}

/// Runs invocations as real subprocesses with inherited stdio, so installer
/// progress and prompts reach the terminal.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    search_path: Option<OsString>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `path` instead of the inherited `PATH`, both for lookups and for
    /// the children's environment.
    pub fn with_search_path(path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(path.into()),
        }
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        match &self.search_path {
            Some(path) => {
                let cwd = std::env::current_dir().ok()?;
                which::which_in(program, Some(path), cwd).ok()
            }
            None => which::which(program).ok(),
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, name: &str, invocation: &Invocation) -> Result<ExitOutcome> {
        let mut cmd = match invocation {
            Invocation::Program { program, args } => {
                let resolved = self.locate(program).ok_or_else(|| Error::CollaboratorMissing {
                    name: name.to_string(),
                    program: program.clone(),
                })?;
                let mut c = Command::new(resolved);
                c.args(args);
                c
            }
            Invocation::Shell { script } => {
                let shell = which::which("sh").unwrap_or_else(|_| PathBuf::from("/bin/sh"));
                let mut c = Command::new(shell);
                c.arg("-c").arg(script);
                c
            }
        };

        if let Some(path) = &self.search_path {
            cmd.env("PATH", path);
        }
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        tracing::info!(collaborator = name, command = %invocation, "running collaborator");
        let status = cmd.status()?;

        Ok(ExitOutcome {
            success: status.success(),
            code: status.code(),
        })
    }

    fn is_installed(&self, binary: &str) -> bool {
        self.locate(binary).is_some()
    }
}

fn check(name: &str, outcome: ExitOutcome) -> Result<()> {
    if outcome.success {
        Ok(())
    } else {
        tracing::error!(collaborator = name, code = ?outcome.code, "collaborator failed");
        Err(Error::CollaboratorFailed {
            name: name.to_string(),
            code: outcome.code,
        })
    }
}

/// `install(names) -> success | failure`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManager {
    pub manager: String,
    pub args: Vec<String>,
}

impl PackageManager {
    pub fn from_section(section: &PackagesSection) -> Self {
        Self {
            manager: section.manager.clone(),
            args: section.args.clone(),
        }
    }

    /// The single invocation that installs `names`, or `None` when empty.
    pub fn invocation(&self, names: &[String]) -> Option<Invocation> {
        if names.is_empty() {
            return None;
        }
        let args = self.args.iter().chain(names).cloned().collect();
        Some(Invocation::Program {
            program: self.manager.clone(),
            args,
        })
    }

    /// Install `names` in one invocation. Returns `false` if there was nothing to do.
    pub fn install(&self, runner: &dyn CommandRunner, names: &[String]) -> Result<bool> {
        let Some(invocation) = self.invocation(names) else {
            return Ok(false);
        };
        check(&self.manager, runner.run(&self.manager, &invocation)?)?;
        Ok(true)
    }
}

/// What a vendor installer step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallerStatus {
    Ran,
    /// The provided binary was already on PATH.
    Skipped,
}

/// An opaque vendor install script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorInstaller {
    pub name: String,
    pub command: String,
    pub provides: Option<String>,
}

impl VendorInstaller {
    pub fn from_section(section: &InstallerSection) -> Self {
        Self {
            name: section.name.clone(),
            command: section.command.clone(),
            provides: section.provides.clone(),
        }
    }

    pub fn invocation(&self) -> Invocation {
        Invocation::Shell {
            script: self.command.clone(),
        }
    }

    /// Whether the installer can be skipped because its binary already exists.
    pub fn already_installed(&self, runner: &dyn CommandRunner) -> bool {
        self.provides
            .as_deref()
            .is_some_and(|binary| runner.is_installed(binary))
    }

    pub fn run(&self, runner: &dyn CommandRunner) -> Result<InstallerStatus> {
        if self.already_installed(runner) {
            tracing::info!(installer = %self.name, "already installed, skipping");
            return Ok(InstallerStatus::Skipped);
        }

        check(&self.name, runner.run(&self.name, &self.invocation())?)?;

        if let Some(binary) = &self.provides
            && !runner.is_installed(binary)
        {
            tracing::warn!(
                installer = %self.name,
                binary = %binary,
                "installer succeeded but its binary is not on PATH yet"
            );
        }
        Ok(InstallerStatus::Ran)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_invocation_orders_args_before_names() {
        let pm = PackageManager {
            manager: "apt-get".to_string(),
            args: vec!["install".to_string(), "-y".to_string()],
        };
        let names = vec!["git".to_string(), "fzf".to_string()];
        assert_eq!(
            pm.invocation(&names),
            Some(Invocation::Program {
                program: "apt-get".to_string(),
                args: vec!["install", "-y", "git", "fzf"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            })
        );
    }

    #[test]
    fn test_package_invocation_empty_names() {
        let pm = PackageManager {
            manager: "apt-get".to_string(),
            args: vec![],
        };
        assert_eq!(pm.invocation(&[]), None);
    }

    #[test]
    fn test_invocation_display() {
        let program = Invocation::Program {
            program: "dnf".to_string(),
            args: vec!["install".to_string(), "jq".to_string()],
        };
        assert_eq!(program.to_string(), "dnf install jq");

        let shell = Invocation::Shell {
            script: "curl x | sh".to_string(),
        };
        assert_eq!(shell.to_string(), "sh -c \"curl x | sh\"");
    }

    #[test]
    fn test_missing_program_reported() {
        let dir = tempfile::tempdir().unwrap();
        let runner = SystemRunner::with_search_path(dir.path());
        let result = runner.run(
            "packages",
            &Invocation::Program {
                program: "definitely-not-a-package-manager".to_string(),
                args: vec![],
            },
        );
        assert!(matches!(result, Err(Error::CollaboratorMissing { .. })));
    }
}
