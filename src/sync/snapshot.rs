//! One-level comparison of a source directory against its replica.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::Path;

use crate::fs::{FileEntry, LocalFs};
use crate::sync::error::{Result, SyncError};
use crate::sync::hash::same_content;

/// How two same-named files are judged identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CompareMode {
    /// Equal size and equal BLAKE3 digest.
    #[default]
    Content,
    /// Equal size and equal modification time.
    Metadata,
}

/// A file present on both sides, as listed on each side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub source: FileEntry,
    pub replica: FileEntry,
}

impl FilePair {
    pub fn name(&self) -> &OsStr {
        &self.source.name
    }

    /// Whether the source copy is strictly newer than the replica copy.
    pub fn source_is_newer(&self) -> bool {
        match (&self.source.modified, &self.replica.modified) {
            (Some(src_time), Some(dst_time)) => src_time > dst_time,
            _ => false,
        }
    }
}

/// Partition of one directory level.
///
/// Entries whose names match but whose kinds differ land in both
/// `source_only` and `replica_only`.
#[derive(Debug, Default)]
pub struct DirectorySnapshot {
    pub source_only: Vec<FileEntry>,
    pub replica_only: Vec<FileEntry>,
    pub common_dirs: Vec<OsString>,
    pub diff_files: Vec<FilePair>,
    /// Common files judged identical; their timestamps may still differ.
    pub same_files: Vec<FilePair>,
    /// Common files whose contents could not be read for comparison.
    pub errors: Vec<SyncError>,
}

impl DirectorySnapshot {
    /// List both directories and partition their children.
    pub fn compare(source_dir: &Path, replica_dir: &Path, mode: CompareMode) -> Result<Self> {
        let source = LocalFs::list_dir(source_dir)
            .map_err(|e| SyncError::from_listing(e, source_dir))?;
        let replica = LocalFs::list_dir(replica_dir)
            .map_err(|e| SyncError::from_listing(e, replica_dir))?;

        Ok(Self::partition(source_dir, replica_dir, source, replica, mode))
    }

    /// Partition already-listed children. `source_dir` and `replica_dir`
    /// are only read when `mode` needs file contents.
    pub fn partition(
        source_dir: &Path,
        replica_dir: &Path,
        source: Vec<FileEntry>,
        replica: Vec<FileEntry>,
        mode: CompareMode,
    ) -> Self {
        let mut snapshot = Self::default();
        let mut replica_map: HashMap<OsString, FileEntry> = replica
            .into_iter()
            .map(|entry| (entry.name.clone(), entry))
            .collect();

        for entry in source {
            let Some(other) = replica_map.remove(&entry.name) else {
                snapshot.source_only.push(entry);
                continue;
            };

            if entry.kind != other.kind {
                snapshot.source_only.push(entry);
                snapshot.replica_only.push(other);
            } else if entry.is_dir() {
                snapshot.common_dirs.push(entry.name);
            } else {
                let pair = FilePair {
                    source: entry,
                    replica: other,
                };
                match Self::files_match(source_dir, replica_dir, &pair, mode) {
                    Ok(true) => snapshot.same_files.push(pair),
                    Ok(false) => snapshot.diff_files.push(pair),
                    Err(err) => snapshot.errors.push(err),
                }
            }
        }

        let mut leftovers: Vec<FileEntry> = replica_map.into_values().collect();
        leftovers.sort_by(|a, b| a.name.cmp(&b.name));
        snapshot.replica_only.extend(leftovers);

        snapshot
    }

    fn files_match(
        source_dir: &Path,
        replica_dir: &Path,
        pair: &FilePair,
        mode: CompareMode,
    ) -> Result<bool> {
        if pair.source.size != pair.replica.size {
            return Ok(false);
        }

        match mode {
            CompareMode::Metadata => Ok(pair.source.modified == pair.replica.modified),
            CompareMode::Content => {
                let replica_path = replica_dir.join(pair.name());
                same_content(&source_dir.join(pair.name()), &replica_path)
                    .map_err(|e| SyncError::from_io(e, "compare", &replica_path))
            }
        }
    }

    /// Whether nothing at this level needs a mutation.
    pub fn is_settled(&self) -> bool {
        self.source_only.is_empty() && self.replica_only.is_empty() && self.diff_files.is_empty()
    }
}
