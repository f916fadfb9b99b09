//! Content digests for deciding whether two files hold the same bytes.
//!
//! BLAKE3 throughout; files over 1 MiB are memory-mapped and hashed on the
//! rayon pool, smaller ones are streamed through a fixed buffer.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const PARALLEL_THRESHOLD: u64 = 1024 * 1024;

/// A computed file digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHash {
    /// Hex-encoded BLAKE3 digest.
    pub value: String,
    /// File size in bytes.
    pub size: u64,
}

/// Hash a file's contents without holding the whole file in memory.
pub fn hash_file(path: &Path) -> io::Result<FileHash> {
    let mut file = File::open(path)?;
    let size = file.metadata()?.len();
    let mut hasher = blake3::Hasher::new();

    if size > PARALLEL_THRESHOLD {
        hasher.update_mmap_rayon(path)?;
        return Ok(FileHash {
            value: hasher.finalize().to_hex().to_string(),
            size,
        });
    }

    let mut buffer = [0u8; 65536];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(FileHash {
        value: hasher.finalize().to_hex().to_string(),
        size,
    })
}

/// Whether two files hold identical bytes. Callers compare sizes first.
pub fn same_content(a: &Path, b: &Path) -> io::Result<bool> {
    Ok(hash_file(a)? == hash_file(b)?)
}
