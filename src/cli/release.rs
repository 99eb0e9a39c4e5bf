use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::HostingArgs;

/// Arguments for the release command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Create release 1.2.3 and point 'latest' at it:\n    ecopack release create --name cloudify-aws-plugin --version 1.2.3\n\n\
                  Require a current changelog first:\n    ecopack release create --name cloudify-aws-plugin --version 1.2.3 --changelog CHANGELOG.txt\n\n\
                  Print the newest released version:\n    ecopack release latest")]
pub struct ReleaseArgs {
    #[command(subcommand)]
    pub command: ReleaseCommand,
}

/// Release subcommands
#[derive(Subcommand, Debug)]
pub enum ReleaseCommand {
    /// Create the release for a version (no-op if it exists) and update 'latest'
    Create(CreateReleaseArgs),

    /// Print the highest released version
    Latest(LatestReleaseArgs),
}

/// Arguments for release create
#[derive(Parser, Debug)]
pub struct CreateReleaseArgs {
    /// Plugin name, used in the release message
    #[arg(long)]
    pub name: String,

    /// Version to release (MAJOR.MINOR.PATCH)
    #[arg(long)]
    pub version: String,

    /// Commit to tag (defaults to the local HEAD)
    #[arg(long, env = "CIRCLE_SHA1")]
    pub commit: Option<String>,

    /// Changelog that must list this version as its newest entry
    #[arg(long)]
    pub changelog: Option<PathBuf>,

    /// Do not touch the 'latest' release
    #[arg(long)]
    pub skip_latest: bool,

    #[command(flatten)]
    pub hosting: HostingArgs,
}

/// Arguments for release latest
#[derive(Parser, Debug)]
pub struct LatestReleaseArgs {
    #[command(flatten)]
    pub hosting: HostingArgs,
}
