// Error propagation and partial-failure isolation

use crate::support::{reconciler, write_file, Trees};
use mirrorsync::sync::SyncError;

#[test]
fn test_missing_replica_root_aborts_pass() {
    let trees = Trees::new();
    std::fs::remove_dir(&trees.replica).unwrap();

    let (reconciler, sink) = reconciler();
    let err = reconciler
        .reconcile(&trees.source, &trees.replica)
        .unwrap_err();

    assert!(matches!(err, SyncError::NotFound { .. }));
    assert!(sink.events().is_empty());
}

#[cfg(unix)]
#[test]
fn test_failed_copy_does_not_block_siblings() {
    use std::os::unix::fs::symlink;

    let trees = Trees::new();
    write_file(&trees.source, "before.txt", "b", 10);
    write_file(&trees.source, "zz_after.txt", "a", 10);
    write_file(&trees.source, "nested/deep.txt", "d", 10);
    write_file(&trees.replica, "nested/stale.txt", "s", 10);
    // Dangling link: listed as a file, copying it fails.
    symlink(trees.source.join("no-such-target"), trees.source.join("broken")).unwrap();

    let (reconciler, _) = reconciler();
    let report = reconciler.reconcile(&trees.source, &trees.replica).unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.stats.failed, 1);
    assert_eq!(
        report.failures[0].path(),
        Some(trees.replica.join("broken").as_path())
    );
    assert!(trees.replica.join("before.txt").exists());
    assert!(trees.replica.join("zz_after.txt").exists());
    assert!(trees.replica.join("nested/deep.txt").exists());
    assert!(!trees.replica.join("nested/stale.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_failure_is_retried_on_next_pass() {
    use std::os::unix::fs::symlink;

    let trees = Trees::new();
    let target = trees.source.join("target.txt");
    symlink(&target, trees.source.join("link")).unwrap();

    let (reconciler, _) = reconciler();
    let first = reconciler.reconcile(&trees.source, &trees.replica).unwrap();
    assert_eq!(first.failures.len(), 1);

    write_file(&trees.source, "target.txt", "resolved", 10);
    let second = reconciler.reconcile(&trees.source, &trees.replica).unwrap();

    assert!(second.is_clean());
    assert_eq!(
        std::fs::read_to_string(trees.replica.join("link")).unwrap(),
        "resolved"
    );
}

#[cfg(unix)]
#[test]
fn test_unlistable_subtree_does_not_block_siblings() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let trees = Trees::new();
    write_file(&trees.source, "locked/inside.txt", "hidden", 10);
    write_file(&trees.replica, "locked/keep.txt", "untouched", 10);
    write_file(&trees.source, "open/visible.txt", "seen", 10);
    write_file(&trees.replica, "open/stale.txt", "stale", 10);
    write_file(&trees.source, "top.txt", "top", 10);

    let locked = trees.source.join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read_dir(&locked).is_ok() {
        // Running with CAP_DAC_OVERRIDE; permissions cannot make this fail.
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let (reconciler, _) = reconciler();
    let report = reconciler.reconcile(&trees.source, &trees.replica);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    let report = report.unwrap();

    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0],
        SyncError::PermissionDenied { operation: "list", .. }
    ));
    assert_eq!(report.failures[0].path(), Some(locked.as_path()));
    assert!(trees.replica.join("locked/keep.txt").exists());
    assert!(!trees.replica.join("locked/inside.txt").exists());
    assert!(trees.replica.join("open/visible.txt").exists());
    assert!(!trees.replica.join("open/stale.txt").exists());
    assert!(trees.replica.join("top.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_non_utf8_names_converge() {
    use std::ffi::OsStr;
    use std::fs;
    use std::os::unix::ffi::OsStrExt;

    let trees = Trees::new();
    let source_name = OsStr::from_bytes(b"caf\xe9.txt");
    let replica_name = OsStr::from_bytes(b"caf\xff.txt");
    fs::write(trees.source.join(source_name), b"latin-1").unwrap();
    fs::write(trees.replica.join(replica_name), b"stale").unwrap();

    let (reconciler, sink) = reconciler();
    let first = reconciler.reconcile(&trees.source, &trees.replica).unwrap();

    assert!(first.is_clean());
    assert_eq!(first.stats.added, 1);
    assert_eq!(first.stats.deleted, 1);
    assert_eq!(sink.events().len(), 2);
    assert_eq!(
        fs::read(trees.replica.join(source_name)).unwrap(),
        b"latin-1"
    );
    assert!(!trees.replica.join(replica_name).exists());

    let second = reconciler.reconcile(&trees.source, &trees.replica).unwrap();
    assert!(second.is_clean());
    assert!(second.actions.is_empty());
}
