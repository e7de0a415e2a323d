//! End-to-end provisioning against fixture profiles and plans.
//!
//! Each test copies fixtures into a temporary home and runs the whole
//! stack: plan loading, collaborators (recorded, never executed), static
//! files, blocks and directive lines.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use profile_core::{
    CommandRunner, EntryState, ExitOutcome, Invocation, Plan, ProvisionOptions, Provisioner,
    StepKind, StepOutcome,
};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures")
}

fn workstation_plan() -> Plan {
    Plan::load(&fixtures().join("plans/workstation.toml")).unwrap()
}

/// Home directory seeded with `fixture` as its `.bashrc`.
fn home_with(fixture: &str) -> TempDir {
    let home = TempDir::new().unwrap();
    home.child(".bashrc")
        .write_file(&fixtures().join("profiles").join(fixture))
        .unwrap();
    home
}

/// Records collaborator invocations; "installs" whatever it runs.
#[derive(Default)]
struct FakeSystem {
    calls: RefCell<Vec<String>>,
    on_path: RefCell<HashSet<String>>,
}

impl CommandRunner for FakeSystem {
    fn run(&self, name: &str, _invocation: &Invocation) -> profile_core::Result<ExitOutcome> {
        self.calls.borrow_mut().push(name.to_string());
        self.on_path.borrow_mut().insert(name.to_string());
        Ok(ExitOutcome {
            success: true,
            code: Some(0),
        })
    }

    fn is_installed(&self, binary: &str) -> bool {
        self.on_path.borrow().contains(binary)
    }
}

#[test]
fn test_fresh_workstation() {
    let home = home_with("debian.bashrc");
    let original = std::fs::read_to_string(home.child(".bashrc").path()).unwrap();
    let plan = workstation_plan();
    let system = FakeSystem::default();

    let report = Provisioner::with_home(&plan, &system, ProvisionOptions::default(), home.path())
        .run()
        .unwrap();

    assert_eq!(*system.calls.borrow(), vec!["apt-get", "starship", "zoxide"]);
    assert_eq!(report.changes(), 8);

    let bashrc = home.child(".bashrc");
    bashrc.assert(predicate::str::starts_with(original.as_str()));
    bashrc.assert(predicate::str::contains("# >>> provision:aliases >>>\nalias ll='ls -alF'"));
    bashrc.assert(predicate::str::ends_with("eval \"$(zoxide init bash)\"\n"));
    home.child(".config/starship.toml")
        .assert(predicate::str::contains("success_symbol"));
}

#[test]
fn test_second_run_is_a_no_op_on_disk() {
    let home = home_with("debian.bashrc");
    let plan = workstation_plan();
    let system = FakeSystem::default();
    let provisioner =
        Provisioner::with_home(&plan, &system, ProvisionOptions::default(), home.path());

    provisioner.run().unwrap();
    let first = std::fs::read_to_string(home.child(".bashrc").path()).unwrap();
    let report = provisioner.run().unwrap();

    assert_eq!(std::fs::read_to_string(home.child(".bashrc").path()).unwrap(), first);
    let profile_changes = report
        .steps
        .iter()
        .filter(|s| matches!(s.kind, StepKind::File | StepKind::Block | StepKind::Line))
        .filter(|s| s.outcome.is_change())
        .count();
    assert_eq!(profile_changes, 0);
    assert!(provisioner.status().unwrap().is_converged());
}

#[test]
fn test_hand_edited_profile_keeps_its_directive() {
    let home = home_with("hand-edited.bashrc");
    let plan = workstation_plan();
    let options = ProvisionOptions {
        skip_collaborators: true,
        ..ProvisionOptions::default()
    };

    let report = Provisioner::with_home(&plan, &FakeSystem::default(), options, home.path())
        .run()
        .unwrap();

    let starship = report
        .steps
        .iter()
        .find(|s| s.name == "starship init bash")
        .unwrap();
    assert_eq!(starship.outcome, StepOutcome::AlreadyPresent);

    let content = std::fs::read_to_string(home.child(".bashrc").path()).unwrap();
    assert_eq!(content.matches("starship init bash").count(), 1);
    assert!(content.starts_with("export PATH=\"$HOME/.local/bin:$PATH\"\n# prompt\n"));
}

#[test]
fn test_existing_static_file_survives() {
    let home = home_with("debian.bashrc");
    home.child(".config/starship.toml")
        .write_str("# mine\n")
        .unwrap();
    let options = ProvisionOptions {
        skip_collaborators: true,
        ..ProvisionOptions::default()
    };

    Provisioner::with_home(&workstation_plan(), &FakeSystem::default(), options, home.path())
        .run()
        .unwrap();

    home.child(".config/starship.toml").assert("# mine\n");
}

#[test]
fn test_status_before_and_after() {
    let home = home_with("debian.bashrc");
    let plan = workstation_plan();
    let system = FakeSystem::default();
    let provisioner =
        Provisioner::with_home(&plan, &system, ProvisionOptions::default(), home.path());

    let before = provisioner.status().unwrap();
    assert!(before.entries.iter().all(|e| e.state == EntryState::Missing));

    provisioner.run().unwrap();

    let after = provisioner.status().unwrap();
    assert!(after.is_converged(), "{:?}", after.entries);
}

#[test]
fn test_dry_run_reports_json_without_writing() {
    let home = home_with("debian.bashrc");
    let original = std::fs::read_to_string(home.child(".bashrc").path()).unwrap();
    let options = ProvisionOptions {
        dry_run: true,
        ..ProvisionOptions::default()
    };
    let system = FakeSystem::default();

    let report = Provisioner::with_home(&workstation_plan(), &system, options, home.path())
        .run()
        .unwrap();

    assert!(system.calls.borrow().is_empty());
    home.child(".bashrc").assert(predicate::str::diff(original));
    home.child(".config/starship.toml")
        .assert(predicate::path::missing());

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["steps"][0]["outcome"], "would-run");
}
