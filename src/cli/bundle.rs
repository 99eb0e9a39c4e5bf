use clap::Parser;
use std::path::PathBuf;

/// Arguments for the bundle command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Build the bundle from the stored registry:\n    ecopack bundle --output dist\n\n\
                  Build from a local registry file and publish it:\n    ecopack bundle --registry plugins.json --upload")]
pub struct BundleArgs {
    /// Local registry document to plan from (defaults to the stored one)
    #[arg(long)]
    pub registry: Option<PathBuf>,

    /// Directory the archive is written to
    #[arg(long, short = 'o', default_value = ".")]
    pub output: PathBuf,

    /// Upload the archive next to the plugins after building it
    #[arg(long)]
    pub upload: bool,

    /// Only print the planned wagon to plugin YAML mapping
    #[arg(long)]
    pub plan: bool,
}
