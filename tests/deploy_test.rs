// Deployment behavior: policies, atomicity and per-destination failures
use ffskel::{
    write_atomic, DeployOutcome, DeployPlan, Deployer, Error, PrefEntry, PrefValue, Policy,
    PreferenceSet,
};
use std::io;
use std::path::Path;
use tempfile::TempDir;

fn hardened_set() -> PreferenceSet {
    PreferenceSet::new(vec![
        PrefEntry::new("browser.shell.checkDefaultBrowser", false),
        PrefEntry::new("browser.newtabpage.enabled", true),
        PrefEntry::new("toolkit.telemetry.enabled", false).with_comment("DisableTelemetry: true"),
    ])
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn test_merge_preserves_user_added_key_unchanged() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("user.js");
    let existing =
        "// lab specific\nuser_pref(\"browser.startup.homepage\", \"https://lab.example\");\n";
    std::fs::write(&dest, existing).unwrap();

    let outcome = Deployer::new(Policy::Merge)
        .deploy(&hardened_set(), &dest)
        .unwrap();
    assert_eq!(
        outcome,
        DeployOutcome::Merged {
            appended: 3,
            kept: 1
        }
    );

    let content = std::fs::read_to_string(&dest).unwrap();
    assert!(content.starts_with(existing));
    let merged = PreferenceSet::parse(&content).unwrap();
    assert_eq!(
        merged.get("browser.startup.homepage"),
        Some(&PrefValue::String("https://lab.example".to_string()))
    );
    assert_eq!(
        merged.get("toolkit.telemetry.enabled"),
        Some(&PrefValue::Bool(false))
    );
}

#[test]
fn test_overwrite_drops_user_added_key() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("user.js");
    std::fs::write(&dest, "user_pref(\"local.only\", 1);\n").unwrap();

    Deployer::new(Policy::Overwrite)
        .deploy(&hardened_set(), &dest)
        .unwrap();

    let set = PreferenceSet::load(&dest).unwrap();
    assert!(!set.contains_key("local.only"));
    assert_eq!(set.len(), 3);
}

#[test]
fn test_interrupted_write_leaves_original_file() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("user.js");
    let original = "user_pref(\"app.update.auto\", false);\n";
    std::fs::write(&dest, original).unwrap();

    let result = write_atomic(&dest, |w| {
        w.write_all(b"user_pref(\"browser.shell.checkDefaultBrowser\", fal")?;
        Err(io::Error::new(io::ErrorKind::Interrupted, "simulated interruption"))
    });

    assert!(matches!(result, Err(Error::PartialWrite { .. })));
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), original);
    assert_eq!(files_in(dir.path()), vec!["user.js".to_string()]);
}

#[test]
fn test_interrupted_write_leaves_no_file() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("user.js");

    let result = write_atomic(&dest, |w| {
        w.write_all(b"user_pref(")?;
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    });

    assert!(result.is_err());
    assert!(!dest.exists());
    assert!(files_in(dir.path()).is_empty());
}

#[test]
fn test_invalid_value_fails_without_touching_destination() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("user.js");
    std::fs::write(&dest, "keep me\n").unwrap();

    let set = PreferenceSet::new(vec![PrefEntry {
        value: PrefValue::Float(0.5),
        ..PrefEntry::new("layout.css.devPixelsPerPx", 0)
    }]);
    let result = Deployer::default().deploy(&set, &dest);

    assert!(matches!(result, Err(Error::InvalidValueType { .. })));
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "keep me\n");
}

fn set_with_float() -> PreferenceSet {
    PreferenceSet::new(vec![
        PrefEntry::new("browser.shell.checkDefaultBrowser", false),
        PrefEntry {
            value: PrefValue::Float(0.5),
            ..PrefEntry::new("layout.css.devPixelsPerPx", 0)
        },
    ])
}

#[test]
fn test_invalid_value_fails_merge_even_when_key_is_present() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("user.js");
    let existing = "user_pref(\"layout.css.devPixelsPerPx\", \"1.0\");\n\
                    user_pref(\"browser.shell.checkDefaultBrowser\", false);\n";
    std::fs::write(&dest, existing).unwrap();

    for policy in [Policy::Merge, Policy::Overwrite] {
        let result = Deployer::new(policy).deploy(&set_with_float(), &dest);
        assert!(
            matches!(result, Err(Error::InvalidValueType { .. })),
            "{} should reject the float value, got {:?}",
            policy,
            result
        );
    }
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), existing);
}

#[test]
fn test_invalid_value_does_not_create_directories() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("new/profile/user.js");
    let deployer = Deployer {
        create_dirs: true,
        ..Deployer::default()
    };

    let result = deployer.deploy(&set_with_float(), &dest);

    assert!(matches!(result, Err(Error::InvalidValueType { .. })));
    assert!(!dir.path().join("new").exists());
}

#[cfg(unix)]
#[test]
fn test_symlinked_destination_updates_link_target() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("shared.js");
    let link = dir.path().join("user.js");
    std::fs::write(&target, "user_pref(\"old\", 1);\n").unwrap();
    std::os::unix::fs::symlink(&target, &link).unwrap();

    Deployer::default().deploy(&hardened_set(), &link).unwrap();

    assert!(std::fs::symlink_metadata(&link)
        .unwrap()
        .file_type()
        .is_symlink());
    let set = PreferenceSet::load(&target).unwrap();
    assert_eq!(set.len(), 3);
    assert!(!set.contains_key("old"));
}

#[test]
fn test_merge_into_unparseable_destination_fails_only_there() {
    let dir = TempDir::new().unwrap();
    let broken = dir.path().join("broken.js");
    let fresh = dir.path().join("fresh.js");
    std::fs::write(&broken, "user_pref(\"x\"").unwrap();

    let reports =
        Deployer::new(Policy::Merge).deploy_all(&hardened_set(), &[broken.clone(), fresh.clone()]);

    assert!(!reports[0].is_ok());
    assert_eq!(std::fs::read_to_string(&broken).unwrap(), "user_pref(\"x\"");
    assert!(matches!(
        reports[1].result,
        Ok(DeployOutcome::Written { entries: 3 })
    ));
}

#[cfg(unix)]
#[test]
fn test_read_only_directory_is_unwritable() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let locked = dir.path().join("locked");
    std::fs::create_dir(&locked).unwrap();
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();

    // privileged users ignore directory modes
    if std::fs::write(locked.join("check-write"), "").is_ok() {
        return;
    }

    let result = Deployer::default().deploy(&hardened_set(), &locked.join("user.js"));
    assert!(matches!(result, Err(Error::DestinationUnwritable { .. })));

    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn test_plan_driven_deploy() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("user.js"),
        "user_pref(\"browser.shell.checkDefaultBrowser\", false);\n",
    )
    .unwrap();
    std::fs::create_dir(dir.path().join("skel")).unwrap();
    let plan_path = dir.path().join("deploy.ini");
    std::fs::write(
        &plan_path,
        "[deploy]\nsource = user.js\npolicy = merge\ncreate_dirs = true\nskel = skel\n\n\
         [destination.extra]\npath = extra/user.js\n",
    )
    .unwrap();

    let plan = DeployPlan::load(&plan_path).unwrap();
    let set = PreferenceSet::load(&plan.source).unwrap();
    let destinations = plan.resolve_destinations().unwrap();
    assert_eq!(destinations.len(), 2);

    let reports = plan.deployer().deploy_all(&set, &destinations);
    assert!(reports.iter().all(|r| r.is_ok()));
    assert!(dir
        .path()
        .join("skel/.mozilla/firefox/default/user.js")
        .is_file());
    assert!(dir.path().join("extra/user.js").is_file());
}
