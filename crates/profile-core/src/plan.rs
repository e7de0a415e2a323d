//! Provisioning plan parsing.
//!
//! A plan is a TOML document listing everything one provisioning run does:
//!
//! ```toml
//! [packages]
//! manager = "apt-get"
//! args = ["install", "-y"]
//! names = ["git", "curl", "fzf"]
//!
//! [[installers]]
//! name = "zoxide"
//! command = "curl -sSfL https://raw.githubusercontent.com/ajeetdsouza/zoxide/main/install.sh | sh"
//! provides = "zoxide"
//!
//! [[blocks]]
//! id = "aliases"
//! body = ["alias ll='ls -alF'"]
//!
//! [[lines]]
//! pattern = "zoxide init"
//! line = 'eval "$(zoxide init bash)"'
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use profile_blocks::{BlockSpec, LinePattern};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Where the profile lives; defaults to `~/.bashrc`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileSection {
    pub path: Option<String>,
}

/// One package-manager invocation: `manager args... names...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackagesSection {
    pub manager: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
}

/// An opaque vendor install command, run through `sh -c`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallerSection {
    pub name: String,
    pub command: String,
    /// Binary the installer provides; when already on PATH the installer is skipped.
    pub provides: Option<String>,
}

/// A static file written once if absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSection {
    pub path: String,
    pub content: String,
}

/// A managed block. Markers default to `# >>> provision:<id> >>>` and
/// `# <<< provision:<id> <<<`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockSection {
    pub id: String,
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(default)]
    pub body: Vec<String>,
}

impl BlockSection {
    pub fn to_spec(&self) -> BlockSpec {
        BlockSpec::new(
            self.id.clone(),
            self.start
                .clone()
                .unwrap_or_else(|| format!("# >>> provision:{} >>>", self.id)),
            self.end
                .clone()
                .unwrap_or_else(|| format!("# <<< provision:{} <<<", self.id)),
            self.body.clone(),
        )
    }
}

/// A directive line keyed on a tolerant pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineSection {
    pub pattern: String,
    pub line: String,
    /// Treat `pattern` as a regular expression instead of a substring.
    #[serde(default)]
    pub regex: bool,
}

impl LineSection {
    pub fn to_pattern(&self) -> Result<LinePattern> {
        let pattern = if self.regex {
            LinePattern::regex(&self.pattern)?
        } else {
            LinePattern::substring(self.pattern.clone())?
        };
        Ok(pattern)
    }
}

/// A full provisioning run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    #[serde(default)]
    pub profile: ProfileSection,
    pub packages: Option<PackagesSection>,
    #[serde(default)]
    pub installers: Vec<InstallerSection>,
    #[serde(default)]
    pub files: Vec<FileSection>,
    #[serde(default)]
    pub blocks: Vec<BlockSection>,
    #[serde(default)]
    pub lines: Vec<LineSection>,
}

impl Plan {
    /// Parse and validate a plan from TOML content.
    ///
    /// # Example
    ///
    /// ```
    /// use profile_core::Plan;
    ///
    /// let plan = Plan::parse(r#"
    /// [[blocks]]
    /// id = "env"
    /// body = ["export EDITOR=vim"]
    /// "#).unwrap();
    ///
    /// assert_eq!(plan.blocks[0].to_spec().start, "# >>> provision:env >>>");
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let plan: Plan = toml::from_str(content)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Load a plan file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::PlanNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let plan: Plan = toml::from_str(&content).map_err(|e| Error::PlanParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        plan.validate()?;
        tracing::debug!(path = %path.display(), "loaded plan");
        Ok(plan)
    }

    /// `<config_dir>/provision/plan.toml`
    pub fn default_location() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("provision").join("plan.toml"))
    }

    /// Reject plans that could never converge.
    pub fn validate(&self) -> Result<()> {
        if let Some(packages) = &self.packages
            && packages.manager.trim().is_empty()
        {
            return invalid("packages.manager must not be empty");
        }

        let mut installer_names = HashSet::new();
        for installer in &self.installers {
            if installer.command.trim().is_empty() {
                return invalid(format!("installer {:?} has an empty command", installer.name));
            }
            if !installer_names.insert(installer.name.as_str()) {
                return invalid(format!("installer {:?} is declared twice", installer.name));
            }
        }

        let mut block_ids = HashSet::new();
        let mut start_markers = HashSet::new();
        for block in &self.blocks {
            let spec = block.to_spec();
            spec.validate()?;
            if !block_ids.insert(block.id.as_str()) {
                return invalid(format!("block {:?} is declared twice", block.id));
            }
            if !start_markers.insert(spec.start.clone()) {
                return invalid(format!("block {:?} reuses another block's start marker", block.id));
            }
        }

        for line in &self.lines {
            let pattern = line.to_pattern()?;
            if line.line.contains('\n') {
                return invalid(format!("line for pattern {:?} spans several lines", line.pattern));
            }
            if !pattern.matches(&line.line) {
                return invalid(format!(
                    "line {:?} does not match its pattern {:?} and would be appended on every run",
                    line.line, line.pattern
                ));
            }
        }

        Ok(())
    }
}

fn invalid<T>(message: impl Into<String>) -> Result<T> {
    Err(Error::PlanInvalid {
        message: message.into(),
    })
}
