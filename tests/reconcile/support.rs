// Shared fixtures for reconcile tests

use filetime::{set_file_mtime, FileTime};
use mirrorsync::sync::{Applier, ReconcileOptions, Reconciler, RecordingSink};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub struct Trees {
    _dir: TempDir,
    pub source: PathBuf,
    pub replica: PathBuf,
}

impl Trees {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        let replica = dir.path().join("replica");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&replica).unwrap();
        Self {
            _dir: dir,
            source,
            replica,
        }
    }
}

/// Write `content` to `root/rel`, creating parents, and pin its mtime.
pub fn write_file(root: &Path, rel: &str, content: &str, mtime_secs: i64) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    set_file_mtime(&path, FileTime::from_unix_time(mtime_secs, 0)).unwrap();
}

pub fn mtime_of(path: &Path) -> FileTime {
    FileTime::from_last_modification_time(&fs::metadata(path).unwrap())
}

pub fn make_dir(root: &Path, rel: &str) {
    fs::create_dir_all(root.join(rel)).unwrap();
}

/// Relative path -> file contents, `None` for directories.
pub fn tree_contents(root: &Path) -> BTreeMap<String, Option<Vec<u8>>> {
    let mut out = BTreeMap::new();
    collect(root, root, &mut out);
    out
}

fn collect(root: &Path, dir: &Path, out: &mut BTreeMap<String, Option<Vec<u8>>>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let rel = path
            .strip_prefix(root)
            .unwrap()
            .to_string_lossy()
            .replace('\\', "/");
        if path.is_dir() {
            out.insert(rel, None);
            collect(root, &path, out);
        } else {
            out.insert(rel, Some(fs::read(&path).unwrap()));
        }
    }
}

pub fn reconciler() -> (Reconciler, Arc<RecordingSink>) {
    reconciler_with(ReconcileOptions::default())
}

pub fn reconciler_with(options: ReconcileOptions) -> (Reconciler, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let reconciler = Reconciler::new(Applier::new(sink.clone()), options);
    (reconciler, sink)
}
