use clap::Parser;

/// Arguments for the notify command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Announce a release:\n    ecopack notify --plugin cloudify-aws-plugin --version 2.5.0 --creator octocat")]
pub struct NotifyArgs {
    /// Plugin name
    #[arg(long)]
    pub plugin: String,

    /// Released version
    #[arg(long)]
    pub version: String,

    /// User who made the release
    #[arg(long, env = "CIRCLE_USERNAME")]
    pub creator: String,

    /// Webhook URL (overrides marketplace.webhook_url)
    #[arg(long)]
    pub webhook_url: Option<String>,
}
