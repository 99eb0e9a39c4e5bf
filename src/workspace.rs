//! CI workspace build outputs

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{self, Result};
use crate::hash::{self, CHECKSUM_SUFFIX};

/// Files in `build_dir` plus a fresh `.md5` companion for each wagon
///
/// Only the top level of `build_dir` is considered. A missing directory yields
/// no files. Stale checksum files from earlier runs are replaced, not listed twice.
pub fn collect_build_files(build_dir: &Path, wagon_suffix: &str) -> Result<Vec<PathBuf>> {
    if !build_dir.is_dir() {
        tracing::info!(dir = %build_dir.display(), "no build directory, nothing to collect");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(build_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| {
            error::fs::read_failed(build_dir.display().to_string(), e.to_string())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        let name = path.to_string_lossy();

        if name
            .strip_suffix(CHECKSUM_SUFFIX)
            .is_some_and(|base| base.ends_with(wagon_suffix))
        {
            continue;
        }

        let is_wagon = name.ends_with(wagon_suffix);
        files.push(path.clone());
        if is_wagon {
            let checksum = hash::write_checksum_file(&path)?;
            tracing::debug!(checksum = %checksum.display(), "wrote checksum");
            files.push(checksum);
        }
    }

    tracing::info!(count = files.len(), "collected workspace files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let files = collect_build_files(&temp.path().join("workspace/build"), ".wgn").unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_collects_files_and_checksums() {
        let temp = TempDir::new().unwrap();
        let build = temp.path().join("build");
        std::fs::create_dir_all(build.join("nested")).unwrap();
        std::fs::write(build.join("plugin.yaml"), "plugins: {}").unwrap();
        std::fs::write(build.join("p-centos-Core.wgn"), "wagon").unwrap();
        std::fs::write(build.join("nested/ignored.wgn"), "wagon").unwrap();

        let files = collect_build_files(&build, ".wgn").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["p-centos-Core.wgn", "p-centos-Core.wgn.md5", "plugin.yaml"]
        );

        let checksum = std::fs::read_to_string(build.join("p-centos-Core.wgn.md5")).unwrap();
        assert!(checksum.starts_with(&crate::hash::md5_bytes(b"wagon")));
    }

    #[test]
    fn test_stale_checksums_not_listed_twice() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("p.wgn"), "wagon").unwrap();

        collect_build_files(temp.path(), ".wgn").unwrap();
        let files = collect_build_files(temp.path(), ".wgn").unwrap();
        assert_eq!(files.len(), 2);
    }
}
