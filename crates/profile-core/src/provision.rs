//! The provisioning runner.
//!
//! Steps run in a fixed order: packages, vendor installers, static files,
//! managed blocks, directive lines. The first collaborator failure aborts
//! the run; nothing already done is rolled back.

use std::path::PathBuf;

use profile_blocks::{ProfileResource, writer};
use profile_fs::{ProfilePath, RobustnessConfig, expand_home};
use serde::Serialize;

use crate::collaborator::{CommandRunner, InstallerStatus, PackageManager, VendorInstaller};
use crate::error::Result;
use crate::plan::Plan;
use crate::static_file::{FileStatus, StaticFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    Packages,
    Installer,
    File,
    Block,
    Line,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Packages => "packages",
            Self::Installer => "installer",
            Self::File => "file",
            Self::Block => "block",
            Self::Line => "line",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepOutcome {
    /// A collaborator ran and succeeded.
    Ran,
    /// A collaborator would run (dry run).
    WouldRun,
    /// Nothing to do for this collaborator.
    Skipped,
    Written,
    Created,
    Appended,
    AlreadyPresent,
}

impl StepOutcome {
    /// Whether the step changed (or in a dry run, would change) the machine.
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Skipped | Self::AlreadyPresent)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ran => "ran",
            Self::WouldRun => "would run",
            Self::Skipped => "skipped",
            Self::Written => "written",
            Self::Created => "added",
            Self::Appended => "added",
            Self::AlreadyPresent => "already configured",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub kind: StepKind,
    pub name: String,
    pub outcome: StepOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Unified diff of a profile edit, recorded in dry runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl StepReport {
    fn new(kind: StepKind, name: impl Into<String>, outcome: StepOutcome) -> Self {
        Self {
            kind,
            name: name.into(),
            outcome,
            warnings: Vec::new(),
            diff: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    pub profile: PathBuf,
    pub dry_run: bool,
    pub steps: Vec<StepReport>,
}

impl ProvisionReport {
    pub fn changes(&self) -> usize {
        self.steps.iter().filter(|s| s.outcome.is_change()).count()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// State of one plan entry as found on the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryState {
    Present,
    Missing,
    /// Installed block whose body differs from the plan.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub kind: StepKind,
    pub name: String,
    pub state: EntryState,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub profile: PathBuf,
    pub entries: Vec<StatusEntry>,
}

impl StatusReport {
    pub fn is_converged(&self) -> bool {
        self.entries.iter().all(|e| e.state == EntryState::Present)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProvisionOptions {
    /// Compute everything, change nothing, invoke no collaborator.
    pub dry_run: bool,
    /// Only files, blocks and lines.
    pub skip_collaborators: bool,
    /// Use this profile instead of the plan's.
    pub profile_override: Option<ProfilePath>,
    pub robustness: RobustnessConfig,
}

pub struct Provisioner<'a> {
    plan: &'a Plan,
    runner: &'a dyn CommandRunner,
    home: PathBuf,
    options: ProvisionOptions,
}

impl<'a> Provisioner<'a> {
    /// A runner for `plan` that expands `~` against the real home directory.
    pub fn new(plan: &'a Plan, runner: &'a dyn CommandRunner, options: ProvisionOptions) -> Result<Self> {
        let home = dirs::home_dir().ok_or(profile_fs::Error::HomeNotFound)?;
        Ok(Self::with_home(plan, runner, options, home))
    }

    /// A runner that expands `~` against `home`.
    pub fn with_home(
        plan: &'a Plan,
        runner: &'a dyn CommandRunner,
        options: ProvisionOptions,
        home: impl Into<PathBuf>,
    ) -> Self {
        Self {
            plan,
            runner,
            home: home.into(),
            options,
        }
    }

    fn expand(&self, raw: &str) -> ProfilePath {
        ProfilePath::new(expand_home(raw, &self.home))
    }

    /// The profile this run edits.
    pub fn profile_path(&self) -> ProfilePath {
        if let Some(path) = &self.options.profile_override {
            return path.clone();
        }
        match &self.plan.profile.path {
            Some(raw) => self.expand(raw),
            None => ProfilePath::new(self.home.join(profile_fs::path::DEFAULT_PROFILE)),
        }
    }

    fn resource(&self) -> ProfileResource {
        ProfileResource::new(self.profile_path())
            .with_robustness(self.options.robustness)
            .dry_run(self.options.dry_run)
    }

    pub fn run(&self) -> Result<ProvisionReport> {
        self.run_with(|_| {})
    }

    /// Run the plan, handing each finished step to `on_step` as it completes.
    pub fn run_with(&self, mut on_step: impl FnMut(&StepReport)) -> Result<ProvisionReport> {
        let profile = self.profile_path();
        let mut steps = Vec::new();
        let mut record = |step: StepReport| {
            on_step(&step);
            steps.push(step);
        };

        if !self.options.skip_collaborators {
            if let Some(packages) = &self.plan.packages {
                record(self.install_packages(packages)?);
            }
            for section in &self.plan.installers {
                record(self.run_installer(&VendorInstaller::from_section(section))?);
            }
        }

        for section in &self.plan.files {
            let file = StaticFile::new(self.expand(&section.path), section.content.clone());
            let outcome = match file.ensure(self.options.robustness, self.options.dry_run)? {
                FileStatus::Written => StepOutcome::Written,
                FileStatus::AlreadyPresent => StepOutcome::AlreadyPresent,
            };
            record(StepReport::new(StepKind::File, file.path.to_string(), outcome));
        }

        let resource = self.resource();
        let label = profile.file_name();

        // A dry run threads one in-memory copy through every edit, so each
        // step sees the ones before it exactly as a real run would.
        let mut preview = if self.options.dry_run {
            Some(resource.read()?)
        } else {
            None
        };

        for section in &self.plan.blocks {
            let spec = section.to_spec();
            let edit = match preview.as_mut() {
                Some(buffer) => {
                    let edit = writer::apply_block(buffer, &spec)?;
                    buffer.clone_from(&edit.after);
                    edit
                }
                None => resource.ensure_block(&spec)?,
            };
            let mut step = StepReport::new(
                StepKind::Block,
                section.id.clone(),
                match edit.status {
                    profile_blocks::BlockStatus::Created => StepOutcome::Created,
                    profile_blocks::BlockStatus::AlreadyPresent => StepOutcome::AlreadyPresent,
                },
            );
            step.warnings = edit.collisions.iter().map(ToString::to_string).collect();
            if self.options.dry_run && edit.has_changes() {
                step.diff = Some(edit.diff_preview(&label));
            }
            record(step);
        }

        for section in &self.plan.lines {
            let pattern = section.to_pattern()?;
            let edit = match preview.as_mut() {
                Some(buffer) => {
                    let edit = writer::apply_line(buffer, &pattern, &section.line)?;
                    buffer.clone_from(&edit.after);
                    edit
                }
                None => resource.ensure_line(&pattern, &section.line)?,
            };
            let mut step = StepReport::new(
                StepKind::Line,
                section.pattern.clone(),
                match edit.status {
                    profile_blocks::LineStatus::Appended => StepOutcome::Appended,
                    profile_blocks::LineStatus::AlreadyPresent => StepOutcome::AlreadyPresent,
                },
            );
            if self.options.dry_run && edit.has_changes() {
                step.diff = Some(edit.diff_preview(&label));
            }
            record(step);
        }

        Ok(ProvisionReport {
            profile: profile.to_path_buf(),
            dry_run: self.options.dry_run,
            steps,
        })
    }

    fn install_packages(&self, section: &crate::plan::PackagesSection) -> Result<StepReport> {
        let manager = PackageManager::from_section(section);
        let name = section.manager.clone();

        let outcome = if section.names.is_empty() {
            StepOutcome::Skipped
        } else if self.options.dry_run {
            StepOutcome::WouldRun
        } else {
            manager.install(self.runner, &section.names)?;
            StepOutcome::Ran
        };
        Ok(StepReport::new(StepKind::Packages, name, outcome))
    }

    fn run_installer(&self, installer: &VendorInstaller) -> Result<StepReport> {
        let outcome = if self.options.dry_run {
            if installer.already_installed(self.runner) {
                StepOutcome::Skipped
            } else {
                StepOutcome::WouldRun
            }
        } else {
            match installer.run(self.runner)? {
                InstallerStatus::Ran => StepOutcome::Ran,
                InstallerStatus::Skipped => StepOutcome::Skipped,
            }
        };
        Ok(StepReport::new(StepKind::Installer, installer.name.clone(), outcome))
    }

    /// Inspect every plan entry without changing anything.
    pub fn status(&self) -> Result<StatusReport> {
        let profile = self.profile_path();
        let resource = self.resource();
        let mut entries = Vec::new();

        let present = |yes: bool| {
            if yes {
                EntryState::Present
            } else {
                EntryState::Missing
            }
        };

        for section in &self.plan.installers {
            let installer = VendorInstaller::from_section(section);
            if installer.provides.is_some() {
                entries.push(StatusEntry {
                    kind: StepKind::Installer,
                    name: installer.name.clone(),
                    state: present(installer.already_installed(self.runner)),
                    warnings: Vec::new(),
                });
            }
        }

        for section in &self.plan.files {
            let path = self.expand(&section.path);
            entries.push(StatusEntry {
                kind: StepKind::File,
                name: path.to_string(),
                state: present(path.exists()),
                warnings: Vec::new(),
            });
        }

        for section in &self.plan.blocks {
            let inspection = resource.inspect_block(&section.to_spec())?;
            let state = match (inspection.present, inspection.stale) {
                (false, _) => EntryState::Missing,
                (true, true) => EntryState::Stale,
                (true, false) => EntryState::Present,
            };
            entries.push(StatusEntry {
                kind: StepKind::Block,
                name: section.id.clone(),
                state,
                warnings: inspection.collisions.iter().map(ToString::to_string).collect(),
            });
        }

        for section in &self.plan.lines {
            let found = resource.inspect_line(&section.to_pattern()?)?;
            entries.push(StatusEntry {
                kind: StepKind::Line,
                name: section.pattern.clone(),
                state: present(found.is_some()),
                warnings: Vec::new(),
            });
        }

        Ok(StatusReport {
            profile: profile.to_path_buf(),
            entries,
        })
    }
}
