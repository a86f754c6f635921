//! BLAKE3 content digests used to detect byte-identical members

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

use blake3::Hasher;

use crate::error::{JarpatchError, Result};

/// Calculate BLAKE3 digest of a file
pub fn hash_file(path: &Path) -> Result<blake3::Hash> {
    let read_error = |e: std::io::Error| JarpatchError::IoError {
        message: format!("Failed to read {}: {}", path.display(), e),
    };

    let file = File::open(path).map_err(read_error)?;

    let mut reader = BufReader::new(file);
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(read_error)?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize())
}

/// Check whether two existing files have byte-identical content
///
/// Sizes are compared first so that most differing files are never read.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    let len_a = fs::metadata(a)?.len();
    let len_b = fs::metadata(b)?.len();
    if len_a != len_b {
        return Ok(false);
    }

    Ok(hash_file(a)? == hash_file(b)?)
}
