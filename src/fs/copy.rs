//! Local copy primitives used by the applier.
//!
//! Both helpers carry the source's access and modification times over to
//! the destination, so a freshly copied entry compares as unchanged on the
//! next pass.

use filetime::{set_file_times, FileTime};
use std::fs::{self, Metadata};
use std::io;
use std::path::Path;

/// Totals for one copy call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyTotals {
    pub files: usize,
    pub dirs: usize,
    pub bytes: u64,
}

/// Copy a single file, overwriting `dst` if it exists.
pub fn copy_file_local(src: &Path, dst: &Path) -> io::Result<CopyTotals> {
    let bytes = fs::copy(src, dst)?;
    apply_times(dst, &fs::metadata(src)?)?;

    Ok(CopyTotals {
        files: 1,
        dirs: 0,
        bytes,
    })
}

/// Copy a directory tree. `dst` must not exist yet.
pub fn copy_dir_local(src: &Path, dst: &Path) -> io::Result<CopyTotals> {
    let mut totals = CopyTotals::default();
    copy_dir_into(src, dst, &mut totals)?;
    Ok(totals)
}

fn copy_dir_into(src: &Path, dst: &Path, totals: &mut CopyTotals) -> io::Result<()> {
    fs::create_dir(dst)?;
    totals.dirs += 1;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if fs::metadata(&src_path)?.is_dir() {
            copy_dir_into(&src_path, &dst_path, totals)?;
        } else {
            let copied = copy_file_local(&src_path, &dst_path)?;
            totals.files += copied.files;
            totals.bytes += copied.bytes;
        }
    }

    // Children are in place; stamping earlier would be undone by their writes.
    apply_times(dst, &fs::metadata(src)?)
}

/// Give `dst` the access and modification times of `src` when their
/// modification times differ. Returns whether `dst` was touched.
pub fn sync_times(src: &Path, dst: &Path) -> io::Result<bool> {
    let source_meta = fs::metadata(src)?;
    let replica_meta = fs::metadata(dst)?;
    if FileTime::from_last_modification_time(&source_meta)
        == FileTime::from_last_modification_time(&replica_meta)
    {
        return Ok(false);
    }

    apply_times(dst, &source_meta)?;
    Ok(true)
}

fn apply_times(dst: &Path, source_meta: &Metadata) -> io::Result<()> {
    let accessed = FileTime::from_last_access_time(source_meta);
    let modified = FileTime::from_last_modification_time(source_meta);
    set_file_times(dst, accessed, modified)
}
