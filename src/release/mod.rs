//! Releases on the version-control host
//!
//! [`ReleaseHost`] is the narrow slice of the hosting API this tool needs;
//! [`ReleaseManager`] layers the release workflow on top of it: idempotent
//! release creation, the `latest` pointer release and asset replacement with
//! bounded retries.

mod github;
#[cfg(test)]
mod memory;

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::asset::basename;
use crate::error::{self, Result};
use crate::retry::RetryPolicy;
use crate::version::{self, LATEST_TAG, VersionCatalog};

pub use github::GitHubHost;
#[cfg(test)]
pub use memory::MemoryHost;

/// A release as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub id: u64,
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub target_commitish: Option<String>,
    #[serde(default)]
    pub upload_url: String,
}

/// A file attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Parameters for a new release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRelease {
    pub tag: String,
    pub name: String,
    pub body: String,
    /// Commit to tag; the host's default branch when `None`
    pub target: Option<String>,
}

pub trait ReleaseHost {
    /// Release with the given tag, `None` if there is none
    fn release_by_tag(&self, tag: &str) -> Result<Option<Release>>;

    fn list_releases(&self) -> Result<Vec<Release>>;

    fn create_release(&self, release: &NewRelease) -> Result<Release>;

    fn update_release_body(&self, release: &Release, body: &str) -> Result<Release>;

    /// True if the repository contains the commit
    fn commit_exists(&self, sha: &str) -> Result<bool>;

    fn list_assets(&self, release: &Release) -> Result<Vec<ReleaseAsset>>;

    fn delete_asset(&self, asset: &ReleaseAsset) -> Result<()>;

    fn upload_asset(
        &self,
        release: &Release,
        name: &str,
        label: &str,
        bytes: &[u8],
    ) -> Result<ReleaseAsset>;
}

/// Text the `latest` release carries
pub fn latest_body(version: &str) -> String {
    format!("The latest release is version {version}.")
}

pub struct ReleaseManager<H> {
    host: H,
    retry: RetryPolicy,
}

impl<H: ReleaseHost> ReleaseManager<H> {
    pub fn new(host: H, retry: RetryPolicy) -> Self {
        Self { host, retry }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Find the release for `name`, or create it tagged `version`
    ///
    /// Calling this again with the same arguments returns the existing release.
    /// When the host refuses `commit` as a target the release is created from
    /// the default branch instead.
    pub fn ensure_release(
        &self,
        name: &str,
        version: &str,
        message: &str,
        commit: Option<&str>,
    ) -> Result<Release> {
        if let Some(existing) = self.host.release_by_tag(name)? {
            tracing::info!(tag = %existing.tag, "release already exists");
            return Ok(existing);
        }
        if version != name {
            if let Some(existing) = self.host.release_by_tag(version)? {
                tracing::info!(tag = %existing.tag, "release already exists");
                return Ok(existing);
            }
        }

        let mut request = NewRelease {
            tag: version.to_string(),
            name: name.to_string(),
            body: message.to_string(),
            target: commit.map(ToOwned::to_owned),
        };
        tracing::info!(tag = version, name, commit, "creating release");

        match self.host.create_release(&request) {
            Ok(release) => return Ok(release),
            Err(err) if err.is_conflict() => {
                // Either the tag appeared since the lookup or the commit was refused
                if let Some(existing) = self.host.release_by_tag(version)? {
                    tracing::info!(tag = %existing.tag, "release created concurrently");
                    return Ok(existing);
                }
                if request.target.is_none() {
                    return Err(err);
                }
                tracing::warn!(
                    commit,
                    error = %err,
                    "commit rejected as release target, using default branch"
                );
                request.target = None;
            }
            Err(err) => return Err(err),
        }
        self.host.create_release(&request)
    }

    /// Point the `latest` release at `version`, creating it on first use
    pub fn publish_latest(&self, version: &str) -> Result<Release> {
        let latest = match self.host.release_by_tag(LATEST_TAG)? {
            Some(release) => release,
            None => {
                tracing::info!("creating the '{LATEST_TAG}' release");
                self.host.create_release(&NewRelease {
                    tag: LATEST_TAG.to_string(),
                    name: LATEST_TAG.to_string(),
                    body: String::new(),
                    target: None,
                })?
            }
        };
        let body = latest_body(version);
        tracing::info!(version, "updating '{LATEST_TAG}' release");
        self.host.update_release_body(&latest, &body)
    }

    /// Release that must already exist
    pub fn require_release(&self, tag: &str) -> Result<Release> {
        self.host
            .release_by_tag(tag)?
            .ok_or_else(|| error::release::not_found(tag))
    }

    /// Highest strict version among the release titles
    pub fn most_recent_release(&self) -> Result<Option<String>> {
        let releases = self.host.list_releases()?;
        Ok(version::select_highest(
            releases.iter().filter_map(|r| r.name.as_deref()),
        ))
    }

    /// True if no existing release is newer than `version`
    pub fn is_newest(&self, version: &str) -> Result<bool> {
        let releases = self.host.list_releases()?;
        let catalog = VersionCatalog::from_labels(
            releases
                .iter()
                .flat_map(|r| r.name.iter().chain(std::iter::once(&r.tag))),
        );
        Ok(catalog.would_be_latest(version))
    }

    /// `sha` if the repository knows it; unknown commits are logged and dropped
    pub fn resolve_commit(&self, sha: Option<&str>) -> Result<Option<String>> {
        let Some(sha) = sha.filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        if self.host.commit_exists(sha)? {
            Ok(Some(sha.to_string()))
        } else {
            tracing::error!(commit = sha, "commit not found");
            Ok(None)
        }
    }

    /// Attach a file to a release, replacing any asset with the same label
    ///
    /// Transient failures are retried per the retry policy. A 422 from the host
    /// means another job uploaded the same asset first and is not an error.
    pub fn upload_asset(&self, release: &Release, path: &Path, label: &str) -> Result<()> {
        let bytes = fs::read(path)
            .map_err(|e| error::fs::read_failed(path.display().to_string(), e.to_string()))?;
        let name = basename(&path.to_string_lossy()).to_string();
        let attempts = self.retry.attempts();
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            tracing::info!(
                path = %path.display(),
                label,
                release = %release.tag,
                attempt,
                "uploading release asset"
            );
            match self.replace_asset(release, &name, label, &bytes) {
                Ok(()) => return Ok(()),
                Err(err) if err.is_conflict() => {
                    tracing::warn!(label, error = %err, "asset already uploaded, skipping");
                    return Ok(());
                }
                Err(err) if err.is_transient() => {
                    tracing::warn!(label, attempt, error = %err, "upload interrupted");
                    last_error = err.to_string();
                    if attempt < attempts {
                        self.retry.wait(attempt);
                    }
                }
                Err(err) => {
                    tracing::error!(
                        path = %path.display(),
                        label,
                        release = %release.tag,
                        "failed to upload release asset"
                    );
                    return Err(err);
                }
            }
        }

        Err(error::retry::exhausted(
            format!("Upload of {label}"),
            attempts,
            last_error,
        ))
    }

    fn replace_asset(&self, release: &Release, name: &str, label: &str, bytes: &[u8]) -> Result<()> {
        for asset in self.host.list_assets(release)? {
            if asset.label.as_deref() == Some(label) || asset.name == name {
                tracing::debug!(asset = %asset.name, "deleting previous asset");
                self.host.delete_asset(&asset)?;
            }
        }
        self.host.upload_asset(release, name, label, bytes)?;
        Ok(())
    }
}
