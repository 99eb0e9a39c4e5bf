//! Notify command implementation

use console::Style;
use std::path::PathBuf;

use crate::cli::NotifyArgs;
use crate::commands::helpers;
use crate::error::{self, Result};
use crate::marketplace::{self, ReleaseNotice};

/// Run notify command
pub fn run(config: Option<PathBuf>, args: NotifyArgs) -> Result<()> {
    let settings = helpers::load_settings(config.as_deref())?;
    let webhook_url = args
        .webhook_url
        .or(settings.marketplace.webhook_url)
        .ok_or_else(|| {
            error::config::invalid("marketplace.webhook_url is required to notify the marketplace")
        })?;

    marketplace::notify(
        &webhook_url,
        &ReleaseNotice {
            plugin_name: &args.plugin,
            version: &args.version,
            creator: &args.creator,
        },
    )?;

    println!(
        "{} marketplace about {} {}",
        Style::new().bold().green().apply_to("Notified"),
        args.plugin,
        args.version
    );
    Ok(())
}
