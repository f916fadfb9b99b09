//! Recursive source/replica reconciliation.
//!
//! Each directory level is listed on both sides and partitioned, common
//! subdirectories are descended into first, then the level's own
//! differences are handed to the [`Applier`] one at a time. Nothing is
//! queued: deeper levels always see every mutation already made above them.
//!
//! Within a level, deletions run before additions so an entry that changed
//! kind (file to directory or back) is removed before its replacement is
//! copied in. Once a level below the root is done, identical files and the
//! directory itself take the source's timestamps.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::Path;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::fs::sync_times;
use crate::sync::action::{Action, ActionKind};
use crate::sync::applier::Applier;
use crate::sync::error::{Result, SyncError};
use crate::sync::event::ChangeEvent;
use crate::sync::snapshot::{CompareMode, DirectorySnapshot};

/// Reconciliation options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    pub compare: CompareMode,
    /// Decide and report actions without touching the replica.
    pub dry_run: bool,
}

/// Pass statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Classified entries; a name whose kind changed is counted on each side.
    pub entries_scanned: usize,
    pub added: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Common files with identical content.
    pub unchanged: usize,
    /// Differing files left alone because the replica copy was not older.
    pub kept_newer: usize,
    /// Identical files and common directories whose replica times were reset.
    pub restamped: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

impl PassStats {
    fn count(&mut self, kind: ActionKind) {
        match kind {
            ActionKind::Add => self.added += 1,
            ActionKind::Update => self.updated += 1,
            ActionKind::Delete => self.deleted += 1,
        }
    }

    pub fn changes(&self) -> usize {
        self.added + self.updated + self.deleted
    }
}

/// Outcome of one pass.
#[derive(Debug, Default)]
pub struct PassReport {
    /// Actions applied, in order (or decided, for a dry run).
    pub actions: Vec<Action>,
    /// One event per applied action. Empty for a dry run.
    pub events: Vec<ChangeEvent>,
    /// Per-entry and per-subtree failures; none of them stopped the pass.
    pub failures: Vec<SyncError>,
    pub stats: PassStats,
    pub dry_run: bool,
    /// The pass stopped early on cancellation.
    pub interrupted: bool,
}

impl PassReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record_failure(&mut self, err: SyncError) {
        warn!("{}", err);
        self.stats.failed += 1;
        self.failures.push(err);
    }
}

/// Stateless between passes; every call recomputes the diff from disk.
pub struct Reconciler {
    applier: Applier,
    options: ReconcileOptions,
    cancel: Option<CancellationToken>,
}

impl Reconciler {
    pub fn new(applier: Applier, options: ReconcileOptions) -> Self {
        Self {
            applier,
            options,
            cancel: None,
        }
    }

    /// Stop between top-level subtrees once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run one pass making `replica` mirror `source`.
    ///
    /// Only a failure to list either root is returned as an error; anything
    /// deeper is collected in [`PassReport::failures`].
    pub fn reconcile(&self, source: &Path, replica: &Path) -> Result<PassReport> {
        let started = Instant::now();
        let mut report = PassReport {
            dry_run: self.options.dry_run,
            ..Default::default()
        };

        let snapshot = DirectorySnapshot::compare(source, replica, self.options.compare)?;
        self.reconcile_level(source, replica, snapshot, true, &mut report);

        report.stats.duration_ms = started.elapsed().as_millis() as u64;
        Ok(report)
    }

    fn reconcile_dir(&self, source: &Path, replica: &Path, report: &mut PassReport) {
        match DirectorySnapshot::compare(source, replica, self.options.compare) {
            Ok(snapshot) => self.reconcile_level(source, replica, snapshot, false, report),
            Err(err) => report.record_failure(err),
        }
    }

    fn reconcile_level(
        &self,
        source: &Path,
        replica: &Path,
        snapshot: DirectorySnapshot,
        is_root: bool,
        report: &mut PassReport,
    ) {
        if snapshot.is_settled() {
            debug!(path = %replica.display(), "level already mirrored");
        }

        let DirectorySnapshot {
            source_only,
            replica_only,
            common_dirs,
            diff_files,
            same_files,
            errors,
        } = snapshot;

        report.stats.entries_scanned += source_only.len()
            + replica_only.len()
            + common_dirs.len()
            + diff_files.len()
            + same_files.len()
            + errors.len();
        report.stats.unchanged += same_files.len();
        for err in errors {
            report.record_failure(err);
        }

        if !self.options.dry_run {
            for pair in &same_files {
                self.restamp(&source.join(pair.name()), &replica.join(pair.name()), report);
            }
        }

        for name in &common_dirs {
            if is_root && self.is_cancelled() {
                info!("Pass interrupted before '{}'", source.join(name).display());
                report.interrupted = true;
                return;
            }
            self.reconcile_dir(&source.join(name), &replica.join(name), report);
        }

        let mut blocked: HashSet<OsString> = HashSet::new();
        for entry in replica_only {
            let action = Action::Delete {
                target: replica.join(&entry.name),
                kind: entry.kind,
            };
            if !self.execute(action, report) {
                blocked.insert(entry.name);
            }
        }

        for entry in source_only {
            if blocked.contains(&entry.name) {
                debug!(name = %entry.name.to_string_lossy(), "skipping add, replica entry could not be removed");
                continue;
            }
            debug!(
                name = %entry.name.to_string_lossy(),
                size = %entry.format_size(),
                "new entry in source"
            );
            self.execute(
                Action::Add {
                    source: source.join(&entry.name),
                    target: replica.join(&entry.name),
                    kind: entry.kind,
                },
                report,
            );
        }

        for pair in diff_files {
            if pair.source_is_newer() {
                self.execute(
                    Action::Update {
                        source: source.join(pair.name()),
                        target: replica.join(pair.name()),
                    },
                    report,
                );
            } else {
                debug!(name = %pair.name().to_string_lossy(), "replica copy is not older, leaving it");
                report.stats.kept_newer += 1;
            }
        }

        // Roots are chosen by the user and keep their own times.
        if !is_root && !self.options.dry_run {
            self.restamp(source, replica, report);
        }
    }

    fn restamp(&self, source: &Path, replica: &Path, report: &mut PassReport) {
        match sync_times(source, replica) {
            Ok(true) => {
                debug!(path = %replica.display(), "timestamps reset from source");
                report.stats.restamped += 1;
            }
            Ok(false) => {}
            Err(err) => report.record_failure(SyncError::from_io(err, "set times on", replica)),
        }
    }

    /// Apply one action, recording the outcome. Returns whether it succeeded.
    fn execute(&self, action: Action, report: &mut PassReport) -> bool {
        if self.options.dry_run {
            info!(
                "Dry run: would {} {} '{}'",
                action.kind(),
                action.entry_kind().label().to_lowercase(),
                action.target().display()
            );
            report.stats.count(action.kind());
            report.actions.push(action);
            return true;
        }

        match self.applier.apply(&action) {
            Ok(event) => {
                report.stats.count(action.kind());
                report.actions.push(action);
                report.events.push(event);
                true
            }
            Err(err) => {
                report.record_failure(err);
                false
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
