//! Decisions handed from the reconciler to the applier.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::fs::EntryKind;

/// Tag of an [`Action`], also carried by change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Add,
    Update,
    Delete,
}

impl ActionKind {
    /// Past-tense verb used in change messages.
    pub fn verb(&self) -> &'static str {
        match self {
            ActionKind::Add => "added",
            ActionKind::Update => "copied",
            ActionKind::Delete => "deleted",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionKind::Add => "add",
            ActionKind::Update => "update",
            ActionKind::Delete => "delete",
        })
    }
}

/// A single mutation of the replica tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Copy a source-only entry (whole subtree for directories).
    Add {
        source: PathBuf,
        target: PathBuf,
        kind: EntryKind,
    },
    /// Overwrite a replica file with a newer source file.
    Update { source: PathBuf, target: PathBuf },
    /// Remove a replica-only entry (whole subtree for directories).
    Delete { target: PathBuf, kind: EntryKind },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Add { .. } => ActionKind::Add,
            Action::Update { .. } => ActionKind::Update,
            Action::Delete { .. } => ActionKind::Delete,
        }
    }

    /// Path under the replica root that this action mutates.
    pub fn target(&self) -> &Path {
        match self {
            Action::Add { target, .. } => target,
            Action::Update { target, .. } => target,
            Action::Delete { target, .. } => target,
        }
    }

    pub fn entry_kind(&self) -> EntryKind {
        match self {
            Action::Add { kind, .. } | Action::Delete { kind, .. } => *kind,
            Action::Update { .. } => EntryKind::File,
        }
    }
}
