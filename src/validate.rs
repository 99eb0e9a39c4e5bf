//! Pre-release checks on plugin sources
//!
//! A plugin's version is declared in its plugin YAML (`package_version` of each
//! entry under `plugins`) and every release needs a matching changelog entry.

use std::fs;
use std::path::Path;

use serde_yaml::Value;

use crate::error::{self, Result};
use crate::version::is_latest_version;

pub const DEFAULT_PLUGIN_YAML: &str = "plugin.yaml";
pub const DEFAULT_CHANGELOG: &str = "CHANGELOG.txt";

fn read_yaml(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .map_err(|e| error::fs::read_failed(path.display().to_string(), e.to_string()))?;
    serde_yaml::from_str(&content).map_err(|e| {
        error::validate::parse_failed(path.display().to_string(), e.to_string())
    })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The single `package_version` shared by all plugins declared in a plugin YAML
pub fn plugin_yaml_version(path: &Path) -> Result<String> {
    let document = read_yaml(path)?;
    let location = path.display().to_string();
    let invalid = |message: String| error::validate::plugin_yaml(location.clone(), message);

    let plugins = document
        .get("plugins")
        .and_then(Value::as_mapping)
        .ok_or_else(|| invalid("no 'plugins' section".to_string()))?;

    let mut version: Option<String> = None;
    for (name, plugin) in plugins {
        let name = scalar_to_string(name).unwrap_or_default();
        let package_version = plugin
            .get("package_version")
            .and_then(scalar_to_string)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| invalid(format!("plugin '{name}' does not specify package_version")))?;

        if let Some(seen) = &version {
            if *seen != package_version {
                return Err(invalid(format!(
                    "more than one plugin version is defined ({seen} and {package_version})"
                )));
            }
        }

        if let Some(source) = plugin.get("source").and_then(Value::as_str) {
            if !source.contains(&package_version) {
                return Err(invalid(format!(
                    "version {package_version} does not match source {source}"
                )));
            }
        }

        tracing::debug!(plugin = %name, package_version, "plugin YAML version");
        version = Some(package_version);
    }

    version.ok_or_else(|| invalid("no plugins declared".to_string()))
}

/// Version labels of a changelog, in file order
///
/// Changelogs are either a mapping keyed by version or a list whose items are
/// versions or single-key mappings.
pub fn changelog_versions(path: &Path) -> Result<Vec<String>> {
    let document = read_yaml(path)?;
    let versions = match &document {
        Value::Mapping(map) => map.keys().filter_map(scalar_to_string).collect(),
        Value::Sequence(items) => items
            .iter()
            .flat_map(|item| match item {
                Value::Mapping(map) => map.keys().filter_map(scalar_to_string).collect(),
                other => scalar_to_string(other).into_iter().collect::<Vec<_>>(),
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(versions)
}

/// Fail unless `version` is the newest entry of the changelog
pub fn check_changelog_version(version: &str, path: &Path) -> Result<()> {
    let versions = changelog_versions(path)?;
    if !is_latest_version(version, &versions) {
        return Err(error::validate::changelog_outdated(
            version,
            path.display().to_string(),
        ));
    }
    tracing::info!(version, changelog = %path.display(), "changelog is current");
    Ok(())
}

/// Run both checks for a plugin source directory and return its version
pub fn validate_plugin_version(directory: &Path, plugin_yaml: &str, changelog: &str) -> Result<String> {
    let version = plugin_yaml_version(&directory.join(plugin_yaml))?;
    check_changelog_version(&version, &directory.join(changelog))?;
    Ok(version)
}
