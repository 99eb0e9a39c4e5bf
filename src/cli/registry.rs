use clap::{Parser, Subcommand};

/// Arguments for the registry command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Print the registry:\n    ecopack registry show\n\n\
                  Preview pointing a plugin at new assets:\n    ecopack registry apply --plugin cloudify-aws-plugin --version 2.5.0 --dry-run plugin.yaml aws-centos-Core.wgn")]
pub struct RegistryArgs {
    #[command(subcommand)]
    pub command: RegistryCommand,
}

/// Registry subcommands
#[derive(Subcommand, Debug)]
pub enum RegistryCommand {
    /// Print the registry document
    Show,

    /// Point a plugin's registry entries at already uploaded assets
    Apply(RegistryApplyArgs),
}

/// Arguments for registry apply
#[derive(Parser, Debug)]
pub struct RegistryApplyArgs {
    /// Plugin name as it appears in the registry
    #[arg(long)]
    pub plugin: String,

    /// Plugin version the assets belong to
    #[arg(long)]
    pub version: String,

    /// Print the resulting document instead of storing it
    #[arg(long)]
    pub dry_run: bool,

    /// Fail when a wagon or checksum matches no registry entry
    #[arg(long)]
    pub strict: bool,

    /// Asset file names, paths or URLs
    #[arg(required = true)]
    pub assets: Vec<String>,
}
