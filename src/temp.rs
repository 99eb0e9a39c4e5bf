//! Scoped working directories for bundle builds
//!
//! Working directories are `TempDir`s, so they are removed on every exit path,
//! including early returns and errors. They are never created under the current
//! working directory, even when `TMPDIR` is relative (e.g. `TMPDIR=tmp` in CI).

use std::env;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::error::{self, Result};

/// Absolute directory under which working directories are created
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        return t;
    }
    #[cfg(windows)]
    {
        env::var("TEMP")
            .or_else(|_| env::var("TMP"))
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
    }
    #[cfg(not(windows))]
    {
        PathBuf::from("/tmp")
    }
}

/// Create a fresh, isolated working directory with the given name prefix
pub fn working_dir(prefix: &str) -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir_in(temp_dir_base())
        .map_err(|e| error::fs::io_error(format!("Failed to create working directory: {e}")))
}
