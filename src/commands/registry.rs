//! Registry command implementation

use console::Style;
use std::io::Write;
use std::path::PathBuf;

use crate::asset::{AssetLocator, AssetSet};
use crate::cli::{RegistryApplyArgs, RegistryArgs, RegistryCommand};
use crate::commands::helpers;
use crate::error::{self, Result};
use crate::registry::apply_assets;
use crate::storage;

/// Run registry command
pub fn run(config: Option<PathBuf>, args: RegistryArgs) -> Result<()> {
    let settings = helpers::load_settings(config.as_deref())?;
    let store = storage::open(&settings.storage)?;
    let registry = helpers::registry_store(&settings, store.as_ref());

    match args.command {
        RegistryCommand::Show => {
            let document = registry.load()?;
            write_stdout(&document.to_json_bytes()?)
        }
        RegistryCommand::Apply(apply) => {
            let locator = AssetLocator::from_config(&settings.storage);
            let RegistryApplyArgs {
                plugin,
                version,
                dry_run,
                strict,
                assets,
            } = apply;
            let assets = AssetSet::from_references(assets);

            let report = if dry_run {
                let current = registry.fetch()?;
                let reconciled =
                    apply_assets(&current.document, &locator, &plugin, &version, &assets)?;
                if strict {
                    reconciled.report.require_all_matched()?;
                }
                write_stdout(&reconciled.document.to_json_bytes()?)?;
                reconciled.report
            } else {
                let report = registry.update(|document| {
                    let reconciled = apply_assets(document, &locator, &plugin, &version, &assets)?;
                    if strict {
                        reconciled.report.require_all_matched()?;
                    }
                    Ok((reconciled.document, reconciled.report))
                })?;
                println!(
                    "{} {}",
                    Style::new().bold().green().apply_to("Updated"),
                    store.describe(registry.key())
                );
                report
            };

            helpers::report_reconciliation(&report);
            Ok(())
        }
    }
}

fn write_stdout(bytes: &[u8]) -> Result<()> {
    std::io::stdout()
        .lock()
        .write_all(bytes)
        .map_err(|e| error::fs::io_error(format!("failed to write to stdout: {e}")))
}
