//! MD5 checksums for wagons and content ETags
//!
//! The registry's `md5url` entries point at `md5sum`-style files, and the
//! filesystem object store uses the same digest as its ETag, like S3 does for
//! single-part uploads.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};

use crate::error::{self, Result};

/// Suffix appended to a file name for its checksum companion
pub const CHECKSUM_SUFFIX: &str = ".md5";

/// Hex MD5 digest of a byte slice
pub fn md5_bytes(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

/// Hex MD5 digest of a file, streamed
pub fn md5_file(path: &Path) -> Result<String> {
    let file = File::open(path)
        .map_err(|e| error::fs::read_failed(path.display().to_string(), e.to_string()))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Md5::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| error::fs::read_failed(path.display().to_string(), e.to_string()))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Write `<path>.md5` next to `path` in `md5sum` output format and return its path
pub fn write_checksum_file(path: &Path) -> Result<PathBuf> {
    let digest = md5_file(path)?;
    let mut checksum_path = path.as_os_str().to_owned();
    checksum_path.push(CHECKSUM_SUFFIX);
    let checksum_path = PathBuf::from(checksum_path);

    let line = format!("{}  {}\n", digest, path.display());
    fs::write(&checksum_path, line).map_err(|e| {
        error::fs::write_failed(checksum_path.display().to_string(), e.to_string())
    })?;

    Ok(checksum_path)
}
