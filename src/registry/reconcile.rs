//! Merge freshly uploaded asset URLs into the registry
//!
//! Only records with the same plugin name and the same major version as the
//! release are touched. Within such a record the plugin YAML replaces `link`,
//! and wagons and checksums replace `url` / `md5url` of the wagon entry whose
//! distribution label matches the file name. Assets without a matching wagon
//! entry are reported, never turned into new entries.

use serde_json::Value;

use super::RegistryDocument;
use crate::asset::{AssetKind, AssetLocator, AssetSet};
use crate::error::{self, Result};
use crate::version::major_version_of;

/// Whether an asset found a place in the matched records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched,
    NoMatchingDistro,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetOutcome {
    pub file_name: String,
    pub url: String,
    pub kind: AssetKind,
    pub outcome: MatchOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Records sharing the plugin name and major version
    pub records_matched: usize,
    pub assets: Vec<AssetOutcome>,
}

impl ReconcileReport {
    pub fn unmatched(&self) -> impl Iterator<Item = &AssetOutcome> {
        self.assets
            .iter()
            .filter(|a| a.outcome == MatchOutcome::NoMatchingDistro)
    }

    /// Fail if any asset found no wagon entry to land in
    pub fn require_all_matched(&self) -> Result<()> {
        let unmatched: Vec<&str> = self.unmatched().map(|a| a.file_name.as_str()).collect();
        if unmatched.is_empty() {
            return Ok(());
        }
        Err(error::registry::invalid(format!(
            "{} asset(s) matched no registry wagon entry (unmatched: {})",
            unmatched.len(),
            unmatched.join(", ")
        )))
    }
}

/// Result of [`apply_assets`]
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub document: RegistryDocument,
    pub report: ReconcileReport,
}

/// Point the records of `plugin` at the assets of `version`
///
/// Pure: the input document is left alone and a new one is returned.
pub fn apply_assets(
    document: &RegistryDocument,
    locator: &AssetLocator,
    plugin: &str,
    version: &str,
    assets: &AssetSet,
) -> Result<Reconciled> {
    let target_major = major_version_of(version)?;
    let mut updated = document.clone();

    let urls: Vec<String> = assets
        .iter()
        .map(|asset| locator.public_url(plugin, version, &asset.file_name))
        .collect();
    let mut matched = vec![false; urls.len()];
    let mut records_matched = 0;

    for (index, record) in updated.raw_records_mut().iter_mut().enumerate() {
        if record.get("name").and_then(Value::as_str) != Some(plugin) {
            continue;
        }
        let record_version = record
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                error::registry::invalid(format!("entry {index} ('{plugin}') has no version"))
            })?;
        if major_version_of(record_version)? != target_major {
            continue;
        }
        records_matched += 1;
        tracing::debug!(plugin, record_version, "updating registry record");

        for ((asset, url), found) in assets.iter().zip(&urls).zip(matched.iter_mut()) {
            let hit = match asset.kind {
                AssetKind::Manifest => {
                    set_field(record, "link", url);
                    true
                }
                AssetKind::Binary | AssetKind::Checksum => {
                    let Some(distro) = asset.distro else {
                        continue;
                    };
                    let field = if asset.kind == AssetKind::Binary {
                        "url"
                    } else {
                        "md5url"
                    };
                    let mut hit = false;
                    if let Some(Value::Array(wagons)) = record.get_mut("wagons") {
                        for wagon in wagons.iter_mut() {
                            if wagon.get("name").and_then(Value::as_str) == Some(distro.label()) {
                                set_field(wagon, field, url);
                                hit = true;
                            }
                        }
                    }
                    hit
                }
            };
            *found |= hit;
        }
    }

    let report = ReconcileReport {
        records_matched,
        assets: assets
            .iter()
            .zip(urls)
            .zip(matched)
            .map(|((asset, url), found)| AssetOutcome {
                file_name: asset.file_name.clone(),
                url,
                kind: asset.kind,
                outcome: if found {
                    MatchOutcome::Matched
                } else {
                    MatchOutcome::NoMatchingDistro
                },
            })
            .collect(),
    };

    Ok(Reconciled {
        document: updated,
        report,
    })
}

fn set_field(object: &mut Value, field: &str, url: &str) {
    if let Value::Object(map) = object {
        map.insert(field.to_string(), Value::String(url.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::fixtures::SAMPLE_REGISTRY;

    const SAMPLE_WAGON: &str = "/build/sample-plugin-3.0.4-centos-Core.wgn";

    fn locator() -> AssetLocator {
        AssetLocator::new("http://repository.cloudifysource.org", "cloudify/wagons")
    }

    fn sample() -> RegistryDocument {
        RegistryDocument::from_slice(SAMPLE_REGISTRY.as_bytes()).unwrap()
    }

    fn raw_json(document: &RegistryDocument, index: usize) -> String {
        serde_json::to_string(document.raw(index).unwrap()).unwrap()
    }

    #[test]
    fn test_sets_wagon_url_and_link_leaving_md5_unset() {
        let assets = AssetSet::from_references([SAMPLE_WAGON, "/build/plugin.yaml"]);
        let result = apply_assets(&sample(), &locator(), "sample-plugin", "3.0.4", &assets).unwrap();

        let record = result.document.record(0).unwrap();
        assert_eq!(
            record.wagons[0].url.as_deref(),
            Some(
                "http://repository.cloudifysource.org/cloudify/wagons/sample-plugin/3.0.4/sample-plugin-3.0.4-centos-Core.wgn"
            )
        );
        assert_eq!(
            record.link.as_deref(),
            Some("http://repository.cloudifysource.org/cloudify/wagons/sample-plugin/3.0.4/plugin.yaml")
        );
        assert_eq!(record.wagons[0].md5url, None);
        assert_eq!(result.report.records_matched, 1);
        assert_eq!(result.report.unmatched().count(), 0);
    }

    #[test]
    fn test_unrelated_records_are_unchanged() {
        let before = sample();
        let assets = AssetSet::from_references([SAMPLE_WAGON, "/build/plugin.yaml"]);
        let after = apply_assets(&before, &locator(), "sample-plugin", "3.0.4", &assets)
            .unwrap()
            .document;

        // The 2.x line of the same plugin and the other plugin are untouched
        assert_eq!(raw_json(&before, 1), raw_json(&after, 1));
        assert_eq!(raw_json(&before, 2), raw_json(&after, 2));
        assert_ne!(raw_json(&before, 0), raw_json(&after, 0));
        assert_eq!(after.len(), before.len());
    }

    #[test]
    fn test_both_major_versions_are_retained() {
        let assets = AssetSet::from_references(["/build/sample-plugin-2.14.21-centos-Core.wgn"]);
        let result = apply_assets(&sample(), &locator(), "sample-plugin", "2.14.21", &assets).unwrap();

        let records = result.document.records().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].wagons[0].url, None);
        assert!(
            records[1].wagons[0]
                .url
                .as_deref()
                .unwrap()
                .ends_with("/2.14.21/sample-plugin-2.14.21-centos-Core.wgn")
        );
    }

    #[test]
    fn test_idempotent() {
        let assets = AssetSet::from_references([
            SAMPLE_WAGON,
            "/build/sample-plugin-3.0.4-centos-Core.wgn.md5",
            "/build/plugin.yaml",
        ]);
        let once = apply_assets(&sample(), &locator(), "sample-plugin", "3.0.4", &assets)
            .unwrap()
            .document;
        let twice = apply_assets(&once, &locator(), "sample-plugin", "3.0.4", &assets)
            .unwrap()
            .document;
        assert_eq!(once, twice);
        assert_eq!(once.to_json_bytes().unwrap(), twice.to_json_bytes().unwrap());
    }

    #[test]
    fn test_checksum_sets_md5url() {
        let assets = AssetSet::from_references(["sample-plugin-3.0.4-centos-Core.wgn.md5"]);
        let result = apply_assets(&sample(), &locator(), "sample-plugin", "3.0.4", &assets).unwrap();
        let record = result.document.record(0).unwrap();
        assert!(record.wagons[0].md5url.as_deref().unwrap().ends_with(".wgn.md5"));
        assert_eq!(record.wagons[0].url, None);
    }

    #[test]
    fn test_missing_distro_is_reported_not_created() {
        let assets = AssetSet::from_references([
            "/build/sample-plugin-3.0.4-redhat-Maipo.wgn",
            "/build/sample-plugin-3.0.4-ubuntu.wgn",
        ]);
        let before = sample();
        let result = apply_assets(&before, &locator(), "sample-plugin", "3.0.4", &assets).unwrap();

        assert_eq!(result.document, before);
        let unmatched: Vec<_> = result.report.unmatched().map(|a| a.file_name.as_str()).collect();
        assert_eq!(
            unmatched,
            vec![
                "sample-plugin-3.0.4-redhat-Maipo.wgn",
                "sample-plugin-3.0.4-ubuntu.wgn"
            ]
        );
    }

    #[test]
    fn test_unknown_plugin_matches_nothing() {
        let assets = AssetSet::from_references(["/build/plugin.yaml"]);
        let before = sample();
        let result = apply_assets(&before, &locator(), "no-such-plugin", "1.0.0", &assets).unwrap();
        assert_eq!(result.report.records_matched, 0);
        assert_eq!(result.document, before);
    }

    #[test]
    fn test_invalid_target_version() {
        let assets = AssetSet::from_references(["/build/plugin.yaml"]);
        let result = apply_assets(&sample(), &locator(), "sample-plugin", "latest", &assets);
        assert!(result.is_err());
    }

    #[test]
    fn test_matching_record_without_version_is_invalid() {
        let document = RegistryDocument::from_slice(br#"[{"name": "p"}]"#).unwrap();
        let assets = AssetSet::from_references(["plugin.yaml"]);
        let result = apply_assets(&document, &locator(), "p", "1.0.0", &assets);
        assert!(matches!(
            result,
            Err(crate::error::EcopackError::RegistryInvalid { .. })
        ));
    }

    #[test]
    fn test_require_all_matched() {
        let assets = AssetSet::from_references([
            SAMPLE_WAGON,
            "/build/sample-plugin-3.0.4-ubuntu-trusty.wgn",
        ]);
        let result = apply_assets(&sample(), &locator(), "sample-plugin", "3.0.4", &assets).unwrap();
        let err = result.report.require_all_matched().unwrap_err();
        assert!(err.to_string().contains("sample-plugin-3.0.4-ubuntu-trusty.wgn"));

        let assets = AssetSet::from_references([SAMPLE_WAGON]);
        let result = apply_assets(&sample(), &locator(), "sample-plugin", "3.0.4", &assets).unwrap();
        assert!(result.report.require_all_matched().is_ok());
    }
}
