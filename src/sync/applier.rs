//! Executes reconciler decisions against the replica tree.
//!
//! Every successful operation reports exactly one [`ChangeEvent`] naming the
//! top-level entry it touched, even when a whole subtree was copied or
//! removed underneath it.

use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::fs::{copy_dir_local, copy_file_local, EntryKind, LocalFs};
use crate::sync::action::{Action, ActionKind};
use crate::sync::error::{Result, SyncError};
use crate::sync::event::{ChangeEvent, ChangeSink};

pub struct Applier {
    sink: Arc<dyn ChangeSink>,
}

impl Applier {
    pub fn new(sink: Arc<dyn ChangeSink>) -> Self {
        Self { sink }
    }

    /// Run one action and report it.
    pub fn apply(&self, action: &Action) -> Result<ChangeEvent> {
        match action {
            Action::Add {
                source,
                target,
                kind,
            } => self.add_entry(source, target, *kind),
            Action::Update { source, target } => self.update_file(source, target),
            Action::Delete { target, kind } => self.delete_entry(target, *kind),
        }
    }

    /// Copy a source-only file or directory tree to a path that must not exist yet.
    pub fn add_entry(&self, source: &Path, target: &Path, kind: EntryKind) -> Result<ChangeEvent> {
        if target.symlink_metadata().is_ok() {
            return Err(SyncError::from_io(
                io::Error::new(io::ErrorKind::AlreadyExists, "destination already exists"),
                "copy",
                target,
            ));
        }

        let totals = match kind {
            EntryKind::Directory => copy_dir_local(source, target),
            EntryKind::File => copy_file_local(source, target),
        }
        .map_err(|e| SyncError::from_io(e, "copy", target))?;

        debug!(
            path = %target.display(),
            files = totals.files,
            dirs = totals.dirs,
            bytes = totals.bytes,
            "copied new entry"
        );
        Ok(self.emit(target, kind, ActionKind::Add))
    }

    /// Overwrite a replica file's content and timestamps from the source file.
    pub fn update_file(&self, source: &Path, target: &Path) -> Result<ChangeEvent> {
        let totals =
            copy_file_local(source, target).map_err(|e| SyncError::from_io(e, "update", target))?;

        debug!(path = %target.display(), bytes = totals.bytes, "overwrote file");
        Ok(self.emit(target, EntryKind::File, ActionKind::Update))
    }

    /// Remove a replica file, or a directory with everything under it.
    pub fn delete_entry(&self, target: &Path, kind: EntryKind) -> Result<ChangeEvent> {
        LocalFs::delete(target).map_err(|e| SyncError::from_io(e, "delete", target))?;
        Ok(self.emit(target, kind, ActionKind::Delete))
    }

    fn emit(&self, target: &Path, kind: EntryKind, action: ActionKind) -> ChangeEvent {
        let event = ChangeEvent::new(target, kind, action);
        self.sink.record(&event);
        event
    }
}
