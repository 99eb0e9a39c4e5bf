//! Bundle command implementation

use console::Style;
use std::fs;
use std::path::PathBuf;

use crate::asset::AssetLocator;
use crate::bundle;
use crate::cli::BundleArgs;
use crate::commands::helpers;
use crate::error::{self, Result};
use crate::progress::ProgressDisplay;
use crate::registry::RegistryDocument;
use crate::storage;

/// Run bundle command
pub fn run(config: Option<PathBuf>, args: BundleArgs) -> Result<()> {
    let settings = helpers::load_settings(config.as_deref())?;
    let store = storage::open(&settings.storage)?;

    let document = match &args.registry {
        Some(path) => {
            let bytes = fs::read(path)
                .map_err(|e| error::fs::read_failed(path.display().to_string(), e.to_string()))?;
            RegistryDocument::from_slice(&bytes)?
        }
        None => helpers::registry_store(&settings, store.as_ref()).load()?,
    };

    let manifest = bundle::plan_bundle(
        &document,
        &settings.bundle.titles,
        &settings.bundle.distros,
    )?;
    if args.plan {
        return helpers::print_json(&manifest);
    }
    if manifest.is_empty() {
        return Err(error::bundle::invalid(
            "no registry entry matches the configured titles and distributions",
        ));
    }

    let locator = AssetLocator::from_config(&settings.storage);
    let progress = ProgressDisplay::new(manifest.len() as u64);
    let archive = bundle::build_archive(
        &manifest,
        &settings.bundle.name,
        &args.output,
        &locator,
        store.as_ref(),
        &progress,
    )?;
    println!(
        "{} {} ({} wagons)",
        Style::new().bold().green().apply_to("Built"),
        archive.display(),
        manifest.len()
    );

    if args.upload {
        let key = format!("{}/{}.tgz", locator.folder(), settings.bundle.name);
        store.put_file(&key, &archive)?;
        println!(
            "{} {}",
            Style::new().bold().green().apply_to("Uploaded"),
            locator.url_for_key(&key)
        );
    }
    Ok(())
}
