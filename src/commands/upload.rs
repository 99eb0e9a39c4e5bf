//! Upload command implementation
//!
//! Attaches build files to the plugin's release, stores them under their
//! canonical storage keys and points the registry at the new URLs.

use console::Style;
use std::path::{Path, PathBuf};

use crate::asset::{AssetLocator, AssetSet, basename};
use crate::cli::UploadArgs;
use crate::commands::helpers;
use crate::error::Result;
use crate::progress::ProgressDisplay;
use crate::registry::{ReconcileReport, RegistryStore, apply_assets};
use crate::release::{Release, ReleaseHost, ReleaseManager};
use crate::storage::{self, ObjectStore};
use crate::workspace;

/// Run upload command
pub fn run(config: Option<PathBuf>, args: UploadArgs) -> Result<()> {
    let settings = helpers::load_settings(config.as_deref())?;

    let files = if args.files.is_empty() {
        workspace::collect_build_files(
            &settings.workspace.build_dir,
            &settings.workspace.wagon_suffix,
        )?
    } else {
        args.files.clone()
    };
    if files.is_empty() {
        println!("No files to upload.");
        return Ok(());
    }

    let store = storage::open(&settings.storage)?;
    let locator = AssetLocator::from_config(&settings.storage);
    let registry = helpers::registry_store(&settings, store.as_ref());
    let progress = ProgressDisplay::new(files.len() as u64);

    let target = if args.no_release {
        None
    } else {
        let manager = helpers::release_manager(&settings, &args.hosting)?;
        let tag = args.release.clone().unwrap_or_else(|| args.version.clone());
        let release = manager.require_release(&tag)?;
        Some((manager, release))
    };

    let upload = PluginUpload {
        plugin: &args.plugin,
        version: &args.version,
        locator: &locator,
        store: store.as_ref(),
        registry: &registry,
        strict: args.strict,
    };
    let report = upload.run(
        target.as_ref().map(|(manager, release)| (manager, release)),
        &files,
        &progress,
    )?;

    println!(
        "{} {} file(s) for {} {}",
        Style::new().bold().green().apply_to("Uploaded"),
        files.len(),
        args.plugin,
        args.version
    );
    helpers::report_reconciliation(&report);
    Ok(())
}

/// One plugin version's files going out to the release, storage and registry
pub struct PluginUpload<'a> {
    pub plugin: &'a str,
    pub version: &'a str,
    pub locator: &'a AssetLocator,
    pub store: &'a dyn ObjectStore,
    pub registry: &'a RegistryStore<'a>,
    /// Refuse to write the registry when an asset matches no wagon entry
    pub strict: bool,
}

impl PluginUpload<'_> {
    /// Upload every file, then reconcile the registry once
    ///
    /// The registry is only touched after all uploads succeeded, so it never
    /// points at files that are not there.
    pub fn run<H: ReleaseHost>(
        &self,
        release: Option<(&ReleaseManager<H>, &Release)>,
        files: &[PathBuf],
        progress: &ProgressDisplay,
    ) -> Result<ReconcileReport> {
        for path in files {
            if let Err(err) = self.upload_file(release, path, progress) {
                progress.abandon();
                return Err(err);
            }
            progress.inc();
        }
        progress.finish();

        let assets = AssetSet::from_paths(files);
        self.registry.update(|document| {
            let reconciled =
                apply_assets(document, self.locator, self.plugin, self.version, &assets)?;
            if self.strict {
                reconciled.report.require_all_matched()?;
            }
            Ok((reconciled.document, reconciled.report))
        })
    }

    fn upload_file<H: ReleaseHost>(
        &self,
        release: Option<(&ReleaseManager<H>, &Release)>,
        path: &Path,
        progress: &ProgressDisplay,
    ) -> Result<()> {
        let name = file_name(path);
        progress.start(&name);

        if let Some((manager, release)) = release {
            manager.upload_asset(release, path, &name)?;
        }

        let key = self.locator.canonical_path(self.plugin, self.version, &name);
        self.store.put_file(&key, path)?;
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    basename(&path.to_string_lossy()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::fixtures::SAMPLE_REGISTRY;
    use crate::registry::{MatchOutcome, RegistryDocument};
    use crate::release::{MemoryHost, NewRelease};
    use crate::retry::RetryPolicy;
    use crate::storage::MemoryObjectStore;
    use tempfile::TempDir;

    const REGISTRY_KEY: &str = "cloudify/wagons/plugins.json";

    fn build_files(temp: &TempDir) -> Vec<PathBuf> {
        let wagon = temp.path().join("sample_plugin-3.1.0-centos-Core-py27.py36-none-linux_x86_64.wgn");
        let yaml = temp.path().join("plugin.yaml");
        std::fs::write(&wagon, b"wagon").unwrap();
        std::fs::write(&yaml, b"plugins: {}").unwrap();
        vec![wagon, yaml]
    }

    #[test]
    fn test_upload_updates_storage_release_and_registry() {
        let temp = TempDir::new().unwrap();
        let files = build_files(&temp);
        let store = MemoryObjectStore::new();
        store.insert(REGISTRY_KEY, SAMPLE_REGISTRY);
        let locator = AssetLocator::new("http://repository.cloudifysource.org", "cloudify/wagons");
        let registry = RegistryStore::new(&store, REGISTRY_KEY, RetryPolicy::immediate(3));

        let manager = ReleaseManager::new(MemoryHost::new(), RetryPolicy::immediate(3));
        let release = manager
            .host()
            .create_release(&NewRelease {
                tag: "3.1.0".to_string(),
                name: "3.1.0".to_string(),
                body: "sample-plugin-v3.1.0".to_string(),
                target: None,
            })
            .unwrap();

        let upload = PluginUpload {
            plugin: "sample-plugin",
            version: "3.1.0",
            locator: &locator,
            store: &store,
            registry: &registry,
            strict: false,
        };
        let report = upload
            .run(Some((&manager, &release)), &files, &ProgressDisplay::hidden(2))
            .unwrap();

        assert_eq!(report.records_matched, 1);
        assert!(report.assets.iter().all(|a| a.outcome == MatchOutcome::Matched));
        assert_eq!(manager.host().assets(release.id).len(), 2);
        assert!(
            store
                .contents("cloudify/wagons/sample-plugin/3.1.0/plugin.yaml")
                .is_some()
        );

        let document =
            RegistryDocument::from_slice(&store.contents(REGISTRY_KEY).unwrap()).unwrap();
        let record = document.record(0).unwrap();
        assert_eq!(
            record.link.as_deref(),
            Some("http://repository.cloudifysource.org/cloudify/wagons/sample-plugin/3.1.0/plugin.yaml")
        );
        assert!(
            record
                .wagon("Centos Core")
                .and_then(|w| w.url.as_deref())
                .is_some_and(|url| url.ends_with(".wgn"))
        );
    }

    #[test]
    fn test_upload_without_release() {
        let temp = TempDir::new().unwrap();
        let files = build_files(&temp);
        let store = MemoryObjectStore::new();
        let locator = AssetLocator::new("http://repository.cloudifysource.org", "cloudify/wagons");
        let registry = RegistryStore::new(&store, REGISTRY_KEY, RetryPolicy::immediate(3));

        let upload = PluginUpload {
            plugin: "brand-new-plugin",
            version: "1.0.0",
            locator: &locator,
            store: &store,
            registry: &registry,
            strict: false,
        };
        let report = upload
            .run::<MemoryHost>(None, &files, &ProgressDisplay::hidden(2))
            .unwrap();

        assert_eq!(report.records_matched, 0);
        assert_eq!(store.keys().len(), 2);
        assert!(store.contents(REGISTRY_KEY).is_none());
    }

    #[test]
    fn test_missing_file_stops_before_registry() {
        let temp = TempDir::new().unwrap();
        let store = MemoryObjectStore::new();
        store.insert(REGISTRY_KEY, SAMPLE_REGISTRY);
        let locator = AssetLocator::new("http://repository.cloudifysource.org", "cloudify/wagons");
        let registry = RegistryStore::new(&store, REGISTRY_KEY, RetryPolicy::immediate(3));

        let upload = PluginUpload {
            plugin: "sample-plugin",
            version: "3.1.0",
            locator: &locator,
            store: &store,
            registry: &registry,
            strict: false,
        };
        let result = upload.run::<MemoryHost>(
            None,
            &[temp.path().join("plugin.yaml")],
            &ProgressDisplay::hidden(1),
        );

        assert!(result.is_err());
        assert_eq!(
            store.contents(REGISTRY_KEY).unwrap(),
            SAMPLE_REGISTRY.as_bytes()
        );
    }

    #[test]
    fn test_strict_unmatched_asset_leaves_registry_alone() {
        let temp = TempDir::new().unwrap();
        let mut files = build_files(&temp);
        let trusty = temp.path().join("sample_plugin-3.1.0-ubuntu-trusty.wgn");
        std::fs::write(&trusty, b"wagon").unwrap();
        files.push(trusty);

        let store = MemoryObjectStore::new();
        store.insert(REGISTRY_KEY, SAMPLE_REGISTRY);
        let locator = AssetLocator::new("http://repository.cloudifysource.org", "cloudify/wagons");
        let registry = RegistryStore::new(&store, REGISTRY_KEY, RetryPolicy::immediate(3));

        let upload = PluginUpload {
            plugin: "sample-plugin",
            version: "3.1.0",
            locator: &locator,
            store: &store,
            registry: &registry,
            strict: true,
        };
        let result = upload.run::<MemoryHost>(None, &files, &ProgressDisplay::hidden(3));

        assert!(matches!(
            result,
            Err(crate::error::EcopackError::RegistryInvalid { .. })
        ));
        // The matched wagon and plugin YAML must not have been published either
        assert_eq!(
            store.contents(REGISTRY_KEY).unwrap(),
            SAMPLE_REGISTRY.as_bytes()
        );
    }
}
