//! One-way mirroring of a source tree onto a replica tree.
//!
//! The [`Reconciler`] decides, the [`Applier`] mutates and reports.

pub mod action;
pub mod applier;
pub mod error;
pub mod event;
pub mod hash;
pub mod reconciler;
pub mod snapshot;

pub use action::{Action, ActionKind};
pub use applier::Applier;
pub use error::{Result, SyncError};
pub use event::{ChangeEvent, ChangeSink, RecordingSink};
pub use hash::{hash_file, same_content, FileHash};
pub use reconciler::{PassReport, PassStats, ReconcileOptions, Reconciler};
pub use snapshot::{CompareMode, DirectorySnapshot, FilePair};
