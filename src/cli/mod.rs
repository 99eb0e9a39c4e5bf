//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - release: Release creation and lookup
//! - upload: Asset upload and registry reconciliation
//! - registry: Registry inspection and offline reconciliation
//! - bundle: Plugins bundle build
//! - validate: Plugin version checks
//! - manager: Orchestration manager queries
//! - notify: Marketplace notification
//! - completions: Completions command arguments
//!
//! Secrets and CI context are read from the environment here, through clap's
//! `env` fallbacks, and nowhere else.

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod bundle;
pub mod completions;
pub mod manager;
pub mod notify;
pub mod registry;
pub mod release;
pub mod upload;
pub mod validate;

pub use bundle::BundleArgs;
pub use completions::CompletionsArgs;
pub use manager::{ManagerArgs, ManagerCommand};
pub use notify::NotifyArgs;
pub use registry::{RegistryApplyArgs, RegistryArgs, RegistryCommand};
pub use release::{CreateReleaseArgs, ReleaseArgs, ReleaseCommand};
pub use upload::UploadArgs;
pub use validate::ValidateArgs;

use crate::config::HostingConfig;

/// ecopack - plugin release and packaging automation
///
/// Creates releases, uploads wagons and plugin YAMLs, keeps the plugins registry
/// current and builds the combined plugins bundle.
#[derive(Parser, Debug)]
#[command(
    name = "ecopack",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Release, registry and bundle automation for plugin repositories",
    long_about = "ecopack creates releases for plugin repositories, uploads their wagons and \
                  plugin YAMLs to object storage, keeps the plugins registry document current \
                  and builds the combined plugins bundle.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  ecopack validate                                   \x1b[90m# Check plugin.yaml and CHANGELOG.txt\x1b[0m\n   \
                  ecopack release create --name foo --version 1.2.3  \x1b[90m# Create release 1.2.3\x1b[0m\n   \
                  ecopack upload --plugin foo --version 1.2.3        \x1b[90m# Upload workspace/build and update the registry\x1b[0m\n   \
                  ecopack registry show                              \x1b[90m# Print the registry document\x1b[0m\n   \
                  ecopack bundle --upload                            \x1b[90m# Build and publish the plugins bundle\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Configuration file (defaults to ./ecopack.yaml, then the user config directory)
    #[arg(long, short = 'c', global = true, env = "ECOPACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Write log lines as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create releases and maintain the 'latest' release
    Release(ReleaseArgs),

    /// Upload build assets and update the registry
    Upload(UploadArgs),

    /// Inspect or reconcile the plugins registry
    Registry(RegistryArgs),

    /// Build the combined plugins bundle
    Bundle(BundleArgs),

    /// Check plugin YAML and changelog versions
    Validate(ValidateArgs),

    /// Query the orchestration manager
    Manager(ManagerArgs),

    /// Notify the marketplace about a release
    Notify(NotifyArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Hosting API access shared by release and upload commands
#[derive(Args, Debug, Clone, Default)]
pub struct HostingArgs {
    /// API token for the hosting service
    #[arg(long, env = "RELEASE_BUILD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Organization owning the repository
    #[arg(long, env = "CIRCLE_PROJECT_USERNAME")]
    pub organization: Option<String>,

    /// Repository name
    #[arg(long, env = "CIRCLE_PROJECT_REPONAME")]
    pub repository: Option<String>,
}

impl HostingArgs {
    /// Fill the hosting configuration; flags and environment win over the file
    pub fn apply(&self, config: &mut HostingConfig) {
        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }
        if let Some(organization) = &self.organization {
            config.organization = Some(organization.clone());
        }
        if let Some(repository) = &self.repository {
            config.repository = Some(repository.clone());
        }
    }
}
