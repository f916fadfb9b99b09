use chrono::{DateTime, Utc};
use std::ffi::OsString;
use std::fs::{self, Metadata};
use std::io;
use std::path::Path;

use crate::fs::types::{EntryKind, FileEntry};

pub struct LocalFs;

impl LocalFs {
    /// List the immediate children of `path`.
    ///
    /// Symbolic links are reported as whatever they point at; a dangling
    /// link falls back to the link itself and is reported as a file.
    pub fn list_dir(path: &Path) -> io::Result<Vec<FileEntry>> {
        let mut entries = Vec::new();

        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let name = entry.file_name();
            let metadata = match fs::metadata(entry.path()) {
                Ok(metadata) => metadata,
                Err(_) => entry.metadata()?,
            };

            entries.push(Self::entry_from_metadata(name, &metadata));
        }

        // Sort: directories first, then by name
        entries.sort_by(|a, b| match (a.is_dir(), b.is_dir()) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            _ => a
                .name
                .to_string_lossy()
                .to_lowercase()
                .cmp(&b.name.to_string_lossy().to_lowercase())
                .then_with(|| a.name.cmp(&b.name)),
        });

        Ok(entries)
    }

    pub fn delete(path: &Path) -> io::Result<()> {
        let metadata = fs::symlink_metadata(path)?;
        if metadata.is_dir() {
            fs::remove_dir_all(path)
        } else if metadata.file_type().is_symlink() && path.is_dir() {
            // Link to a directory: only the link goes, never its target.
            Self::remove_dir_link(path)
        } else {
            fs::remove_file(path)
        }
    }

    #[cfg(windows)]
    fn remove_dir_link(path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }

    #[cfg(not(windows))]
    fn remove_dir_link(path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn entry_from_metadata(name: OsString, metadata: &Metadata) -> FileEntry {
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        FileEntry {
            name,
            kind,
            size: if metadata.is_dir() { 0 } else { metadata.len() },
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        }
    }
}
