//! Manager command implementation
//!
//! Every subcommand prints its result as JSON on stdout.

use std::path::PathBuf;

use serde_json::Value;

use crate::cli::{ManagerArgs, ManagerCommand};
use crate::commands::helpers;
use crate::error::Result;
use crate::manager::{
    self, DEFAULT_EXTERNAL_RESOURCE_KEY, DEFAULT_RESOURCE_ID_KEY, ManagerApi, ManagerClient,
    ManagerOperation, NameLookup,
};

/// Run manager command
pub fn run(config: Option<PathBuf>, args: ManagerArgs) -> Result<()> {
    let settings = helpers::load_settings(config.as_deref())?;
    let mut manager_config = settings.manager.clone();
    args.connection.apply(&mut manager_config);
    let client = ManagerClient::new(&manager_config)?;

    let value = query(&client, args.command)?;
    helpers::print_json(&value)
}

/// Run one subcommand against `api`
pub fn query(api: &dyn ManagerApi, command: ManagerCommand) -> Result<Value> {
    let operation = match command {
        ManagerCommand::Nodes { deployment } => ManagerOperation::ListNodes {
            deployment_id: deployment,
        },
        ManagerCommand::NodeInstances { node, deployment } => {
            ManagerOperation::ListNodeInstances {
                node_id: node,
                deployment_id: deployment,
            }
        }
        ManagerCommand::Outputs { deployment } => ManagerOperation::DeploymentOutputs {
            deployment_id: deployment,
        },
        ManagerCommand::Secret { key } => ManagerOperation::GetSecret { key },
        ManagerCommand::Resources {
            deployment,
            node_type,
            exclusions,
            name_property,
        } => {
            return match name_property {
                Some(name_property) => {
                    let lookup = NameLookup {
                        name_property: &name_property,
                        external_resource_key: DEFAULT_EXTERNAL_RESOURCE_KEY,
                        resource_id_key: DEFAULT_RESOURCE_ID_KEY,
                    };
                    let names = manager::deployment_resource_names(
                        api,
                        &deployment,
                        &node_type,
                        &exclusions,
                        &lookup,
                    )?;
                    Ok(serde_json::to_value(names)?)
                }
                None => {
                    let nodes = manager::deployment_resources_by_node_type(
                        api,
                        &deployment,
                        &node_type,
                        &exclusions,
                    )?;
                    Ok(serde_json::to_value(nodes)?)
                }
            };
        }
    };

    manager::execute(api, &operation)
}
