//! Release command implementation
//!
//! `release create` converges on one release per version and keeps the
//! `latest` release pointing at the highest version. `release latest` prints
//! the highest released version.

use console::Style;
use std::path::PathBuf;

use crate::cli::release::LatestReleaseArgs;
use crate::cli::{CreateReleaseArgs, ReleaseArgs, ReleaseCommand};
use crate::commands::helpers;
use crate::error::{self, Result};
use crate::release::{Release, ReleaseHost, ReleaseManager};
use crate::validate;
use crate::version;

/// Run release command
pub fn run(config: Option<PathBuf>, args: ReleaseArgs) -> Result<()> {
    match args.command {
        ReleaseCommand::Create(args) => create(config, args),
        ReleaseCommand::Latest(args) => latest(config, args),
    }
}

fn create(config: Option<PathBuf>, args: CreateReleaseArgs) -> Result<()> {
    if version::parse_strict(&args.version).is_none() {
        return Err(error::version::invalid(&args.version));
    }
    if let Some(changelog) = &args.changelog {
        validate::check_changelog_version(&args.version, changelog)?;
    }

    let settings = helpers::load_settings(config.as_deref())?;
    let manager = helpers::release_manager(&settings, &args.hosting)?;
    let commit = args.commit.clone().or_else(helpers::head_commit);

    let outcome = create_release(
        &manager,
        &args.name,
        &args.version,
        commit.as_deref(),
        !args.skip_latest,
    )?;

    println!(
        "{} {} ({})",
        Style::new().bold().green().apply_to("Release"),
        outcome.release.tag,
        outcome.release.name.as_deref().unwrap_or_default()
    );
    if outcome.latest_updated {
        println!(
            "{} now points at {}",
            Style::new().bold().apply_to(version::LATEST_TAG),
            args.version
        );
    }
    Ok(())
}

fn latest(config: Option<PathBuf>, args: LatestReleaseArgs) -> Result<()> {
    let settings = helpers::load_settings(config.as_deref())?;
    let manager = helpers::release_manager(&settings, &args.hosting)?;
    match manager.most_recent_release()? {
        Some(version) => println!("{version}"),
        None => eprintln!("No releases found."),
    }
    Ok(())
}

/// What [`create_release`] did
#[derive(Debug)]
pub struct ReleaseOutcome {
    pub release: Release,
    pub latest_updated: bool,
}

/// Ensure the release for `version` exists and move `latest` forward if it is the newest
pub fn create_release<H: ReleaseHost>(
    manager: &ReleaseManager<H>,
    name: &str,
    version: &str,
    commit: Option<&str>,
    update_latest: bool,
) -> Result<ReleaseOutcome> {
    let commit = manager.resolve_commit(commit)?;
    let message = format!("{name}-v{version}");
    let release = manager.ensure_release(version, version, &message, commit.as_deref())?;

    let mut latest_updated = false;
    if update_latest {
        if manager.is_newest(version)? {
            manager.publish_latest(version)?;
            latest_updated = true;
        } else {
            tracing::info!(version, "a newer release exists, leaving 'latest' alone");
        }
    }

    Ok(ReleaseOutcome {
        release,
        latest_updated,
    })
}
