//! Profile edits under awkward conditions: concurrent writers, CRLF files,
//! symlinked dotfiles and preserved permissions.

use std::sync::{Arc, Barrier};
use std::thread;

use pretty_assertions::assert_eq;
use profile_blocks::{BlockSpec, LinePattern, ProfileResource};
use profile_fs::RobustnessConfig;
use profile_test_utils::profile::TestProfile;

fn env_block() -> BlockSpec {
    BlockSpec::new(
        "env",
        "# >>> provision:env >>>",
        "# <<< provision:env <<<",
        ["export EDITOR=vim"],
    )
}

#[test]
fn test_concurrent_runs_append_once() {
    let profile = TestProfile::with_content("HISTSIZE=1000\n");
    let path = profile.path().to_path_buf();
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let resource = ProfileResource::new(path).with_robustness(RobustnessConfig {
                    enable_fsync: false,
                    ..RobustnessConfig::default()
                });
                barrier.wait();
                resource.ensure_block(&env_block()).unwrap();
                resource
                    .ensure_line(
                        &LinePattern::substring("zoxide init").unwrap(),
                        "eval \"$(zoxide init bash)\"",
                    )
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    profile.assert_occurrences("# >>> provision:env >>>", 1);
    profile.assert_occurrences("zoxide init", 1);
    assert!(profile.content().starts_with("HISTSIZE=1000\n"));
}

#[test]
fn test_crlf_profile_stays_crlf() {
    let profile = TestProfile::with_content("HISTSIZE=1000\r\nshopt -s histappend\r\n");
    let resource = ProfileResource::new(profile.path().to_path_buf());

    resource.ensure_block(&env_block()).unwrap();

    assert_eq!(
        profile.content(),
        "HISTSIZE=1000\r\nshopt -s histappend\r\n\r\n\
         # >>> provision:env >>>\r\n\
         export EDITOR=vim\r\n\
         # <<< provision:env <<<\r\n"
    );
}

#[cfg(unix)]
#[test]
fn test_symlinked_dotfile_keeps_link() {
    let profile = TestProfile::new();
    let dotfiles = profile.home().join("dotfiles");
    std::fs::create_dir(&dotfiles).unwrap();
    let target = dotfiles.join("bashrc");
    std::fs::write(&target, "HISTSIZE=1000\n").unwrap();
    std::os::unix::fs::symlink(&target, profile.path()).unwrap();

    ProfileResource::new(profile.path().to_path_buf())
        .ensure_block(&env_block())
        .unwrap();

    assert!(
        std::fs::symlink_metadata(profile.path())
            .unwrap()
            .file_type()
            .is_symlink()
    );
    let written = std::fs::read_to_string(&target).unwrap();
    assert!(written.contains("export EDITOR=vim"));
}

#[cfg(unix)]
#[test]
fn test_permissions_preserved() {
    use std::os::unix::fs::PermissionsExt;

    let profile = TestProfile::with_content("HISTSIZE=1000\n");
    std::fs::set_permissions(profile.path(), std::fs::Permissions::from_mode(0o600)).unwrap();

    ProfileResource::new(profile.path().to_path_buf())
        .ensure_block(&env_block())
        .unwrap();

    let mode = std::fs::metadata(profile.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
