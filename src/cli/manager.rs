use clap::{Args, Parser, Subcommand};

use crate::config::ManagerConfig;

/// Arguments for the manager command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List nodes of a deployment:\n    ecopack manager nodes --deployment nc\n\n\
                  Names of all EC2 instances a deployment created:\n    ecopack manager resources --deployment nc --node-type cloudify.nodes.aws.ec2.Instances --name-property aws_resource_id")]
pub struct ManagerArgs {
    #[command(flatten)]
    pub connection: ManagerConnectionArgs,

    #[command(subcommand)]
    pub command: ManagerCommand,
}

/// Manager connection settings
#[derive(Args, Debug, Clone, Default)]
pub struct ManagerConnectionArgs {
    /// Manager address
    #[arg(long, env = "ECOSYSTEM_SESSION_MANAGER_IP")]
    pub host: Option<String>,

    #[arg(long, env = "ECOSYSTEM_SESSION_MANAGER_USER")]
    pub username: Option<String>,

    #[arg(long, env = "ECOSYSTEM_SESSION_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, env = "ECOSYSTEM_SESSION_MANAGER_TENANT")]
    pub tenant: Option<String>,
}

impl ManagerConnectionArgs {
    pub fn apply(&self, config: &mut ManagerConfig) {
        if let Some(host) = &self.host {
            config.host = Some(host.clone());
        }
        if let Some(username) = &self.username {
            config.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.password = Some(password.clone());
        }
        if let Some(tenant) = &self.tenant {
            config.tenant = tenant.clone();
        }
    }
}

/// Manager subcommands
#[derive(Subcommand, Debug)]
pub enum ManagerCommand {
    /// List the nodes of a deployment
    Nodes {
        #[arg(long)]
        deployment: String,
    },

    /// List the instances of a node
    NodeInstances {
        #[arg(long)]
        node: String,

        #[arg(long)]
        deployment: Option<String>,
    },

    /// Show deployment outputs
    Outputs {
        #[arg(long)]
        deployment: String,
    },

    /// Show a secret
    Secret {
        key: String,
    },

    /// Nodes of a deployment by type, with their instances' runtime properties
    Resources {
        #[arg(long)]
        deployment: String,

        /// Substring the node type must contain
        #[arg(long)]
        node_type: String,

        /// Skip node types containing this substring (repeatable)
        #[arg(long = "exclude")]
        exclusions: Vec<String>,

        /// Print one name per instance read from this runtime property
        #[arg(long)]
        name_property: Option<String>,
    },
}
