//! Single-edit commands: ensure-block, ensure-line, remove-block

use std::path::Path;

use colored::Colorize;
use profile_blocks::{
    BlockSpec, BlockStatus, Edit, LinePattern, LineStatus, ProfileResource, RemoveStatus,
};
use profile_fs::ProfilePath;

use super::{print_diff, print_warnings};
use crate::error::{CliError, Result};

/// Run the ensure-block command
pub fn run_ensure_block(
    profile: ProfilePath,
    id: &str,
    start: &str,
    end: &str,
    body: &[String],
    body_file: Option<&Path>,
    dry_run: bool,
) -> Result<()> {
    let body = match body_file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| CliError::user(format!("cannot read {}: {e}", path.display())))?
            .lines()
            .map(ToString::to_string)
            .collect(),
        None => body.to_vec(),
    };
    let spec = BlockSpec::new(id, start, end, body);
    let resource = ProfileResource::new(profile).dry_run(dry_run);

    let edit = resource.ensure_block(&spec)?;
    let label = match edit.status {
        BlockStatus::Created => "added".green(),
        BlockStatus::AlreadyPresent => "already configured".dimmed(),
    };
    println!("{} block {} in {}", label, id.cyan(), resource.path());
    print_warnings(
        &edit
            .collisions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
    );
    finish(&resource, &edit);
    Ok(())
}

/// Run the ensure-line command
pub fn run_ensure_line(
    profile: ProfilePath,
    pattern: &str,
    line: &str,
    regex: bool,
    dry_run: bool,
) -> Result<()> {
    let matcher = if regex {
        LinePattern::regex(pattern)?
    } else {
        LinePattern::substring(pattern)?
    };
    let resource = ProfileResource::new(profile).dry_run(dry_run);

    let edit = resource.ensure_line(&matcher, line)?;
    let label = match edit.status {
        LineStatus::Appended => "added".green(),
        LineStatus::AlreadyPresent => "already configured".dimmed(),
    };
    println!("{} line {} in {}", label, pattern.cyan(), resource.path());
    finish(&resource, &edit);
    Ok(())
}

/// Run the remove-block command
pub fn run_remove_block(profile: ProfilePath, start: &str, end: &str, dry_run: bool) -> Result<()> {
    let resource = ProfileResource::new(profile).dry_run(dry_run);

    let edit = resource.remove_block(start, end)?;
    let label = match edit.status {
        RemoveStatus::Removed => "removed".green(),
        RemoveStatus::NotPresent => "not present".dimmed(),
    };
    println!("{} block {} in {}", label, start.cyan(), resource.path());
    finish(&resource, &edit);
    Ok(())
}

fn finish<S>(resource: &ProfileResource, edit: &Edit<S>) {
    if resource.is_dry_run() && edit.has_changes() {
        println!();
        print_diff(&edit.diff_preview(&resource.path().file_name()));
        println!();
        println!("{}", "Dry run: nothing was written.".dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profile_test_utils::profile::TestProfile;

    fn profile_of(profile: &TestProfile) -> ProfilePath {
        ProfilePath::new(profile.path())
    }

    #[test]
    fn test_ensure_block_twice() {
        let profile = TestProfile::with_content("HISTSIZE=1000\n");
        let body = vec!["export EDITOR=vim".to_string()];

        for _ in 0..2 {
            run_ensure_block(profile_of(&profile), "env", "# BEGIN env", "# END env", &body, None, false)
                .unwrap();
        }

        profile.assert_occurrences("# BEGIN env", 1);
        assert!(profile.content().starts_with("HISTSIZE=1000\n"));
    }

    #[test]
    fn test_ensure_block_body_file() {
        let profile = TestProfile::new();
        let body_file = profile.home().join("body.sh");
        std::fs::write(&body_file, "alias ll='ls -l'\nalias la='ls -A'\n").unwrap();

        run_ensure_block(
            profile_of(&profile),
            "aliases",
            "# BEGIN aliases",
            "# END aliases",
            &[],
            Some(&body_file),
            false,
        )
        .unwrap();

        assert!(profile.content().contains("alias ll='ls -l'\nalias la='ls -A'\n# END aliases"));
    }

    #[test]
    fn test_ensure_block_missing_body_file() {
        let profile = TestProfile::new();
        let err = run_ensure_block(
            profile_of(&profile),
            "a",
            "# BEGIN",
            "# END",
            &[],
            Some(&profile.home().join("nope")),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::User { .. }));
    }

    #[test]
    fn test_ensure_line_dry_run_writes_nothing() {
        let profile = TestProfile::with_content("HISTSIZE=1000\n");

        run_ensure_line(profile_of(&profile), "zoxide init", "eval \"$(zoxide init bash)\"", false, true)
            .unwrap();

        assert_eq!(profile.content(), "HISTSIZE=1000\n");
    }

    #[test]
    fn test_ensure_line_bad_regex() {
        let profile = TestProfile::new();
        let err = run_ensure_line(profile_of(&profile), "(", "x", true, false).unwrap_err();
        assert!(matches!(err, CliError::Blocks(_)));
    }

    #[test]
    fn test_ensure_line_rejects_line_outside_pattern() {
        let profile = TestProfile::with_content("HISTSIZE=1000\n");

        let err = run_ensure_line(
            profile_of(&profile),
            "zoxide init bash",
            "eval \"$(zoxide init --cmd cd bash)\"",
            false,
            false,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            CliError::Blocks(profile_blocks::Error::InvalidDirective { .. })
        ));
        assert_eq!(profile.content(), "HISTSIZE=1000\n");
    }

    #[test]
    fn test_remove_block_round_trip() {
        let profile = TestProfile::with_content("HISTSIZE=1000\n");
        run_ensure_block(
            profile_of(&profile),
            "env",
            "# BEGIN env",
            "# END env",
            &["export EDITOR=vim".to_string()],
            None,
            false,
        )
        .unwrap();

        run_remove_block(profile_of(&profile), "# BEGIN env", "# END env", false).unwrap();

        assert_eq!(profile.content(), "HISTSIZE=1000\n");
    }
}
