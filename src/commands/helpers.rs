//! Command helper utilities

use std::path::Path;

use console::Style;
use serde::Serialize;

use crate::cli::HostingArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::registry::{ReconcileReport, RegistryStore};
use crate::release::{GitHubHost, ReleaseManager};
use crate::storage::ObjectStore;

/// Load settings from the `--config` path or the default lookup order
pub fn load_settings(config: Option<&Path>) -> Result<Settings> {
    let (settings, origin) = Settings::load(config)?;
    match origin {
        Some(path) => tracing::debug!(config = %path.display(), "using configuration file"),
        None => tracing::debug!("using built-in configuration"),
    }
    Ok(settings)
}

/// Registry store over the configured registry key
pub fn registry_store<'a>(settings: &Settings, store: &'a dyn ObjectStore) -> RegistryStore<'a> {
    RegistryStore::new(store, settings.storage.registry_key(), settings.retry.clone())
}

/// Release manager talking to the hosting API, with flags applied over the file
pub fn release_manager(
    settings: &Settings,
    hosting: &HostingArgs,
) -> Result<ReleaseManager<GitHubHost>> {
    let mut config = settings.hosting.clone();
    hosting.apply(&mut config);
    let host = GitHubHost::new(&config)?;
    Ok(ReleaseManager::new(host, settings.retry.clone()))
}

/// HEAD of the repository containing the current directory, if any
pub fn head_commit() -> Option<String> {
    let repo = git2::Repository::discover(".").ok()?;
    let head = repo.head().ok()?;
    let commit = head.peel_to_commit().ok()?;
    Some(commit.id().to_string())
}

/// Pretty-print a value as JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the reconciliation outcome, warning about unmatched assets
pub fn report_reconciliation(report: &ReconcileReport) {
    let label = Style::new().bold().for_stderr();
    eprintln!(
        "{} {}",
        label.apply_to("Registry records matched:"),
        report.records_matched
    );

    for asset in report.unmatched() {
        tracing::warn!(
            file = %asset.file_name,
            kind = %asset.kind,
            "no registry wagon entry matches this asset"
        );
        eprintln!(
            "  {} {}",
            Style::new().yellow().for_stderr().apply_to("unmatched"),
            asset.file_name
        );
    }
}
