//! Combined plugins bundle
//!
//! A bundle is a `.tgz` with one top-level directory named after the bundle.
//! Inside it every selected wagon gets its own directory (the wagon file name
//! without its extension) holding the wagon and its plugin YAML, and a
//! `METADATA` YAML file maps each wagon path to its plugin YAML path:
//!
//! ```text
//! cloudify-plugins-bundle/
//!   METADATA
//!   cloudify_aws_plugin-2.5.0-centos-Core/
//!     cloudify_aws_plugin-2.5.0-centos-Core.wgn
//!     plugin.yaml
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;

use crate::asset::{AssetLocator, basename};
use crate::error::{self, Result};
use crate::progress::ProgressDisplay;
use crate::registry::RegistryDocument;
use crate::storage::ObjectStore;
use crate::temp;

/// Name of the path mapping file at the bundle root
pub const METADATA_FILE: &str = "METADATA";

/// Which wagons go into the bundle: wagon reference to plugin YAML reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BundleManifest {
    entries: BTreeMap<String, String>,
}

impl BundleManifest {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Contents of the `METADATA` file: archive-relative wagon path to plugin YAML path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BundleMetadata {
    entries: BTreeMap<String, String>,
}

impl BundleMetadata {
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.entries)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Select the wagons of allowed plugins built for allowed distributions
///
/// Plugins and distributions outside the allow-lists are skipped. A selected
/// plugin without a YAML link cannot be bundled and is an error.
pub fn plan_bundle(
    document: &RegistryDocument,
    titles: &[String],
    distros: &[String],
) -> Result<BundleManifest> {
    let mut entries = BTreeMap::new();

    for record in document.records()? {
        if !titles.contains(&record.title) {
            continue;
        }
        let link = record.link.as_deref().ok_or_else(|| {
            error::bundle::invalid(format!(
                "plugin '{}' {} has no plugin YAML link",
                record.name, record.version
            ))
        })?;

        for wagon in record.wagons.iter().filter(|w| distros.contains(&w.name)) {
            match &wagon.url {
                Some(url) => {
                    entries.insert(url.clone(), link.to_string());
                }
                None => tracing::warn!(
                    plugin = %record.name,
                    version = %record.version,
                    distro = %wagon.name,
                    "wagon has no URL, leaving it out of the bundle"
                ),
            }
        }
    }

    tracing::info!(wagons = entries.len(), "planned bundle");
    Ok(BundleManifest { entries })
}

/// Fetch every planned wagon and YAML and pack them into `<name>.tgz` in `destination`
///
/// Everything is staged in a temporary directory that is removed on every
/// exit path. No archive is left behind if any entry fails to resolve.
pub fn build_archive(
    manifest: &BundleManifest,
    name: &str,
    destination: &Path,
    locator: &AssetLocator,
    store: &dyn ObjectStore,
    progress: &ProgressDisplay,
) -> Result<PathBuf> {
    let working = temp::working_dir("ecopack-bundle-")?;

    let metadata = match stage_entries(manifest, working.path(), locator, store, progress) {
        Ok(metadata) => metadata,
        Err(err) => {
            progress.abandon();
            return Err(err);
        }
    };

    let metadata_path = working.path().join(METADATA_FILE);
    fs::write(&metadata_path, metadata.to_yaml()?).map_err(|e| {
        error::fs::write_failed(metadata_path.display().to_string(), e.to_string())
    })?;

    fs::create_dir_all(destination).map_err(|e| {
        error::fs::write_failed(destination.display().to_string(), e.to_string())
    })?;
    let archive_path = destination.join(format!("{name}.tgz"));

    if let Err(err) = write_archive(working.path(), name, &archive_path) {
        let _ = fs::remove_file(&archive_path);
        progress.abandon();
        return Err(err);
    }

    progress.finish();
    tracing::info!(
        archive = %archive_path.display(),
        wagons = metadata.len(),
        "bundle archive written"
    );
    Ok(archive_path)
}

fn stage_entries(
    manifest: &BundleManifest,
    root: &Path,
    locator: &AssetLocator,
    store: &dyn ObjectStore,
    progress: &ProgressDisplay,
) -> Result<BundleMetadata> {
    let mut metadata = BundleMetadata::default();

    for (wagon, yaml) in manifest.iter() {
        progress.start(wagon);
        let wagon_name = basename(wagon);
        let yaml_name = basename(yaml);
        let dir_name = wagon_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(wagon_name);

        let plugin_dir = root.join(dir_name);
        fs::create_dir(&plugin_dir).map_err(|e| {
            error::bundle::invalid(format!(
                "cannot create directory for '{wagon_name}': {e}"
            ))
        })?;

        tracing::debug!(wagon, yaml, "fetching bundle entry");
        locator.resolve_to(store, wagon, &plugin_dir.join(wagon_name))?;
        locator.resolve_to(store, yaml, &plugin_dir.join(yaml_name))?;

        metadata.entries.insert(
            format!("{dir_name}/{wagon_name}"),
            format!("{dir_name}/{yaml_name}"),
        );
        progress.inc();
    }

    Ok(metadata)
}

fn write_archive(source: &Path, name: &str, archive_path: &Path) -> Result<()> {
    let archive_error =
        |e: std::io::Error| error::bundle::archive_failed(archive_path.display().to_string(), e.to_string());

    let file = File::create(archive_path).map_err(archive_error)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.append_dir_all(name, source).map_err(archive_error)?;
    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .map_err(archive_error)?;
    Ok(())
}
