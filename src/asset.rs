//! Asset locations and classification
//!
//! Every uploaded file lives at `{folder}/{plugin}/{version}/{basename}` in the
//! bucket and is published as `{domain}/{folder}/{plugin}/{version}/{basename}`.
//! The registry stores the public URL; resolving a URL strips the domain again
//! to obtain the storage key.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::config::{CENTOS, REDHAT, StorageConfig};
use crate::error::{self, Result};
use crate::storage::ObjectStore;

/// Operating system distribution a wagon is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Distro {
    CentosCore,
    RedhatMaipo,
}

impl Distro {
    pub const ALL: [Distro; 2] = [Distro::CentosCore, Distro::RedhatMaipo];

    /// Label used as `WagonRecord.name` in the registry
    pub fn label(self) -> &'static str {
        match self {
            Distro::CentosCore => CENTOS,
            Distro::RedhatMaipo => REDHAT,
        }
    }

    /// Marker that wagon file names for this distro contain
    pub fn substring(self) -> &'static str {
        match self {
            Distro::CentosCore => "centos-Core",
            Distro::RedhatMaipo => "redhat-Maipo",
        }
    }

    /// Distro whose marker appears in `file_name`
    pub fn detect(file_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| file_name.contains(d.substring()))
    }
}

impl fmt::Display for Distro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What role a file plays for its plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Plugin YAML, referenced by `PluginRecord.link`
    Manifest,
    /// MD5 file, referenced by `WagonRecord.md5url`
    Checksum,
    /// The wagon itself, referenced by `WagonRecord.url`
    Binary,
}

impl AssetKind {
    pub fn classify(file_name: &str) -> Self {
        if file_name.ends_with(".yaml") {
            AssetKind::Manifest
        } else if file_name.contains("md5") {
            AssetKind::Checksum
        } else {
            AssetKind::Binary
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Manifest => "manifest",
            AssetKind::Checksum => "checksum",
            AssetKind::Binary => "binary",
        };
        f.write_str(name)
    }
}

/// One file produced by a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub file_name: String,
    pub kind: AssetKind,
    /// Only set for binaries and checksums
    pub distro: Option<Distro>,
}

impl Asset {
    pub fn new(reference: impl Into<String>) -> Self {
        let reference = reference.into();
        let file_name = basename(&reference).to_string();
        let kind = AssetKind::classify(&file_name);
        let distro = match kind {
            AssetKind::Manifest => None,
            AssetKind::Checksum | AssetKind::Binary => Distro::detect(&file_name),
        };
        Self {
            file_name,
            kind,
            distro,
        }
    }
}

/// The files produced by one build of one plugin
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSet {
    assets: Vec<Asset>,
}

impl AssetSet {
    pub fn from_references<I, S>(references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            assets: references.into_iter().map(Asset::new).collect(),
        }
    }

    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Self {
        Self::from_references(
            paths
                .iter()
                .map(|p| p.as_ref().to_string_lossy().into_owned()),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter()
    }
}

/// Last path segment of a local path or URL
pub fn basename(reference: &str) -> &str {
    reference
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(reference)
}

/// Builds storage keys and public URLs for plugin assets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLocator {
    domain: String,
    folder: String,
}

impl AssetLocator {
    pub fn new(domain: impl AsRef<str>, folder: impl AsRef<str>) -> Self {
        Self {
            domain: domain.as_ref().trim_end_matches('/').to_string(),
            folder: folder.as_ref().trim_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.domain, &config.folder)
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Storage key for a plugin file; only the file's base name is used
    pub fn canonical_path(&self, plugin: &str, version: &str, file_name: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.folder,
            plugin,
            version,
            basename(file_name)
        )
    }

    /// Public URL for a plugin file
    pub fn public_url(&self, plugin: &str, version: &str, file_name: &str) -> String {
        self.url_for_key(&self.canonical_path(plugin, version, file_name))
    }

    /// Public URL for an arbitrary storage key
    pub fn url_for_key(&self, key: &str) -> String {
        format!("{}/{}", self.domain, key)
    }

    /// Storage key behind a public URL, `None` if the reference is not under the domain
    pub fn storage_key(&self, reference: &str) -> Option<String> {
        reference
            .strip_prefix(&self.domain)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
            .map(ToOwned::to_owned)
    }

    /// Read an asset from the store, falling back to the local filesystem
    pub fn fetch(&self, store: &dyn ObjectStore, reference: &str) -> Result<Vec<u8>> {
        if let Some(key) = self.storage_key(reference) {
            if let Some(object) = store.get(&key)? {
                tracing::debug!(reference, key = %key, "fetched asset from storage");
                return Ok(object.bytes);
            }
            tracing::debug!(reference, key = %key, "asset not in storage, trying local path");
        }

        let local = Path::new(reference);
        if local.is_file() {
            return fs::read(local)
                .map_err(|e| error::fs::read_failed(reference, e.to_string()));
        }

        Err(error::asset::not_found(reference))
    }

    /// Fetch an asset into `destination`
    pub fn resolve_to(
        &self,
        store: &dyn ObjectStore,
        reference: &str,
        destination: &Path,
    ) -> Result<()> {
        let bytes = self.fetch(store, reference)?;
        fs::write(destination, bytes)
            .map_err(|e| error::fs::write_failed(destination.display().to_string(), e.to_string()))
    }
}
