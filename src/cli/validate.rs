use clap::Parser;
use std::path::PathBuf;

use crate::validate::{DEFAULT_CHANGELOG, DEFAULT_PLUGIN_YAML};

/// Arguments for the validate command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Validate the plugin in the current directory:\n    ecopack validate\n\n\
                  Validate another checkout:\n    ecopack validate --directory ../cloudify-aws-plugin")]
pub struct ValidateArgs {
    /// Plugin source directory
    #[arg(long, short = 'd', default_value = ".")]
    pub directory: PathBuf,

    /// Plugin YAML file name inside the directory
    #[arg(long, default_value = DEFAULT_PLUGIN_YAML)]
    pub plugin_yaml: String,

    /// Changelog file name inside the directory
    #[arg(long, default_value = DEFAULT_CHANGELOG)]
    pub changelog: String,
}
