use clap::Parser;
use std::path::PathBuf;

use super::HostingArgs;

/// Arguments for the upload command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Upload everything in workspace/build:\n    ecopack upload --plugin cloudify-aws-plugin --version 2.5.0\n\n\
                  Upload specific files and fail on unmatched wagons:\n    ecopack upload --plugin cloudify-aws-plugin --version 2.5.0 --strict plugin.yaml build/aws-centos-Core.wgn\n\n\
                  Only upload to storage and the registry:\n    ecopack upload --plugin cloudify-aws-plugin --version 2.5.0 --no-release")]
pub struct UploadArgs {
    /// Plugin name as it appears in the registry
    #[arg(long)]
    pub plugin: String,

    /// Plugin version the files belong to
    #[arg(long)]
    pub version: String,

    /// Release tag to attach files to (defaults to the version)
    #[arg(long)]
    pub release: Option<String>,

    /// Skip attaching files to the release
    #[arg(long)]
    pub no_release: bool,

    /// Fail when a wagon or checksum matches no registry entry
    #[arg(long)]
    pub strict: bool,

    /// Files to upload (defaults to the workspace build directory)
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub hosting: HostingArgs,
}
