//! Deployment-orchestration manager REST client
//!
//! Integration tests inspect what a deployment created: its nodes, their
//! instances' runtime properties, deployment outputs and secrets. The queries
//! are a closed set ([`ManagerOperation`]) executed against [`ManagerApi`].

use reqwest::header::HeaderValue;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ManagerConfig;
use crate::error::{self, Result};
use crate::http;
use crate::runtime;

pub const DEFAULT_EXTERNAL_RESOURCE_KEY: &str = "use_external_resource";
pub const DEFAULT_RESOURCE_ID_KEY: &str = "resource_id";

const TENANT_HEADER: &str = "Tenant";

/// Queries the manager supports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerOperation {
    ListNodes {
        deployment_id: String,
    },
    ListNodeInstances {
        node_id: String,
        deployment_id: Option<String>,
    },
    DeploymentOutputs {
        deployment_id: String,
    },
    GetSecret {
        key: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub deployment_id: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NodeInstance {
    pub id: String,
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub runtime_properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Secret {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

pub trait ManagerApi {
    fn nodes(&self, deployment_id: &str) -> Result<Vec<Node>>;

    fn node_instances(&self, node_id: &str, deployment_id: Option<&str>) -> Result<Vec<NodeInstance>>;

    fn deployment_outputs(&self, deployment_id: &str) -> Result<Map<String, Value>>;

    fn secret(&self, key: &str) -> Result<Secret>;
}

/// Run one operation and return its result as JSON
pub fn execute(api: &dyn ManagerApi, operation: &ManagerOperation) -> Result<Value> {
    tracing::debug!(?operation, "manager request");
    let value = match operation {
        ManagerOperation::ListNodes { deployment_id } => {
            serde_json::to_value(api.nodes(deployment_id)?)?
        }
        ManagerOperation::ListNodeInstances {
            node_id,
            deployment_id,
        } => serde_json::to_value(api.node_instances(node_id, deployment_id.as_deref())?)?,
        ManagerOperation::DeploymentOutputs { deployment_id } => {
            Value::Object(api.deployment_outputs(deployment_id)?)
        }
        ManagerOperation::GetSecret { key } => serde_json::to_value(api.secret(key)?)?,
    };
    Ok(value)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceInstance {
    pub id: String,
    pub runtime_properties: Map<String, Value>,
}

/// A deployment node with the runtime state of its instances
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceNode {
    pub id: String,
    pub node_type: String,
    pub properties: Map<String, Value>,
    pub instances: Vec<ResourceInstance>,
}

/// Nodes of a deployment whose type contains `type_substring`
///
/// Types containing any of `exclusions` are skipped.
pub fn deployment_resources_by_node_type(
    api: &dyn ManagerApi,
    deployment_id: &str,
    type_substring: &str,
    exclusions: &[String],
) -> Result<Vec<ResourceNode>> {
    let mut resources = Vec::new();

    for node in api.nodes(deployment_id)? {
        if !node.node_type.contains(type_substring)
            || exclusions.iter().any(|e| node.node_type.contains(e.as_str()))
        {
            continue;
        }
        tracing::debug!(node = %node.id, node_type = %node.node_type, "collecting node");

        let instances = api
            .node_instances(&node.id, Some(deployment_id))?
            .into_iter()
            .map(|instance| ResourceInstance {
                id: instance.id,
                runtime_properties: instance.runtime_properties,
            })
            .collect();

        resources.push(ResourceNode {
            id: node.id,
            node_type: node.node_type,
            properties: node.properties,
            instances,
        });
    }

    Ok(resources)
}

/// Property names to read for [`deployment_resource_names`]
#[derive(Debug, Clone)]
pub struct NameLookup<'a> {
    /// Runtime property holding the resource name
    pub name_property: &'a str,
    /// Node property flagging an externally created resource
    pub external_resource_key: &'a str,
    /// Node property holding the external resource's id
    pub resource_id_key: &'a str,
}

/// One name per matching node instance
///
/// The runtime property wins; instances of external resources fall back to the
/// node's resource id property. Instances with neither yield `None`.
pub fn deployment_resource_names(
    api: &dyn ManagerApi,
    deployment_id: &str,
    type_substring: &str,
    exclusions: &[String],
    lookup: &NameLookup<'_>,
) -> Result<Vec<Option<String>>> {
    let mut names = Vec::new();

    for node in deployment_resources_by_node_type(api, deployment_id, type_substring, exclusions)? {
        let external = node
            .properties
            .get(lookup.external_resource_key)
            .and_then(Value::as_bool)
            .unwrap_or(false);

        for instance in &node.instances {
            let name = instance
                .runtime_properties
                .get(lookup.name_property)
                .and_then(value_as_name)
                .or_else(|| {
                    external
                        .then(|| node.properties.get(lookup.resource_id_key))
                        .flatten()
                        .and_then(value_as_name)
                });
            names.push(name);
        }
    }

    Ok(names)
}

fn value_as_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Deserialize)]
struct ListResponse<T> {
    items: Vec<T>,
}

#[derive(Deserialize)]
struct OutputsResponse {
    #[serde(default)]
    outputs: Map<String, Value>,
}

/// [`ManagerApi`] over the manager's REST API
pub struct ManagerClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
    tenant: String,
}

impl ManagerClient {
    pub fn new(config: &ManagerConfig) -> Result<Self> {
        let host = config
            .host
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| error::config::invalid("manager.host is required for manager queries"))?;
        HeaderValue::from_str(&config.tenant)
            .map_err(|e| error::config::invalid(format!("manager.tenant: {e}")))?;

        Ok(Self {
            client: http::client()?,
            base_url: format!(
                "{}://{}/api/{}",
                config.protocol,
                host.trim_end_matches('/'),
                config.api_version
            ),
            username: config.username.clone(),
            password: config.password.clone().unwrap_or_else(|| "admin".to_string()),
            tenant: config.tenant.clone(),
        })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}/{}", self.base_url, path))
            .basic_auth(&self.username, Some(&self.password))
            .header(TENANT_HEADER, &self.tenant)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        runtime::block_on(async move {
            let response = request.send().await.map_err(http::transport_error)?;
            if response.status() != StatusCode::OK {
                let (status, message) = http::failure(response).await;
                return Err(error::manager::api(status, message));
            }
            response.json::<T>().await.map_err(http::transport_error)
        })?
    }
}

impl ManagerApi for ManagerClient {
    fn nodes(&self, deployment_id: &str) -> Result<Vec<Node>> {
        let response: ListResponse<Node> =
            self.send(self.get("nodes").query(&[("deployment_id", deployment_id)]))?;
        Ok(response.items)
    }

    fn node_instances(&self, node_id: &str, deployment_id: Option<&str>) -> Result<Vec<NodeInstance>> {
        let mut request = self.get("node-instances").query(&[("node_id", node_id)]);
        if let Some(deployment_id) = deployment_id {
            request = request.query(&[("deployment_id", deployment_id)]);
        }
        let response: ListResponse<NodeInstance> = self.send(request)?;
        Ok(response.items)
    }

    fn deployment_outputs(&self, deployment_id: &str) -> Result<Map<String, Value>> {
        let response: OutputsResponse = self.send(self.get(&format!("deployments/{deployment_id}/outputs")))?;
        Ok(response.outputs)
    }

    fn secret(&self, key: &str) -> Result<Secret> {
        self.send(self.get(&format!("secrets/{key}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct MemoryManager {
        nodes: Vec<Node>,
        instances: Vec<NodeInstance>,
        outputs: Map<String, Value>,
        secrets: Vec<Secret>,
    }

    impl ManagerApi for MemoryManager {
        fn nodes(&self, deployment_id: &str) -> Result<Vec<Node>> {
            Ok(self
                .nodes
                .iter()
                .filter(|n| n.deployment_id.as_deref() == Some(deployment_id))
                .cloned()
                .collect())
        }

        fn node_instances(&self, node_id: &str, _deployment_id: Option<&str>) -> Result<Vec<NodeInstance>> {
            Ok(self
                .instances
                .iter()
                .filter(|i| i.node_id.as_deref() == Some(node_id))
                .cloned()
                .collect())
        }

        fn deployment_outputs(&self, _deployment_id: &str) -> Result<Map<String, Value>> {
            Ok(self.outputs.clone())
        }

        fn secret(&self, key: &str) -> Result<Secret> {
            self.secrets
                .iter()
                .find(|s| s.key == key)
                .cloned()
                .ok_or_else(|| error::manager::api(404, format!("Requested `Secret` with ID `{key}` was not found")))
        }
    }

    fn node(id: &str, node_type: &str, properties: Value) -> Node {
        Node {
            id: id.to_string(),
            node_type: node_type.to_string(),
            deployment_id: Some("dep".to_string()),
            properties: properties.as_object().cloned().unwrap_or_default(),
        }
    }

    fn instance(id: &str, node_id: &str, runtime: Value) -> NodeInstance {
        NodeInstance {
            id: id.to_string(),
            node_id: Some(node_id.to_string()),
            runtime_properties: runtime.as_object().cloned().unwrap_or_default(),
        }
    }

    fn manager() -> MemoryManager {
        MemoryManager {
            nodes: vec![
                node("vm", "cloudify.nodes.aws.ec2.Instances", json!({})),
                node(
                    "vpc",
                    "cloudify.nodes.aws.ec2.Vpc",
                    json!({"use_external_resource": true, "resource_id": "vpc-123"}),
                ),
                node("sg", "cloudify.nodes.aws.ec2.SecurityGroup", json!({})),
                node("app", "cloudify.nodes.Root", json!({})),
            ],
            instances: vec![
                instance("vm_1", "vm", json!({"aws_resource_id": "i-abc"})),
                instance("vm_2", "vm", json!({})),
                instance("vpc_1", "vpc", json!({})),
                instance("sg_1", "sg", json!({"aws_resource_id": "sg-1"})),
            ],
            outputs: json!({"endpoint": "10.0.0.1"}).as_object().cloned().unwrap(),
            secrets: vec![Secret {
                key: "agent_key".to_string(),
                value: Some("secret".to_string()),
            }],
        }
    }

    #[test]
    fn test_execute_dispatches_each_operation() {
        let api = manager();

        let nodes = execute(&api, &ManagerOperation::ListNodes {
            deployment_id: "dep".to_string(),
        })
        .unwrap();
        assert_eq!(nodes.as_array().unwrap().len(), 4);
        assert_eq!(nodes[0]["type"], "cloudify.nodes.aws.ec2.Instances");

        let instances = execute(&api, &ManagerOperation::ListNodeInstances {
            node_id: "vm".to_string(),
            deployment_id: Some("dep".to_string()),
        })
        .unwrap();
        assert_eq!(instances.as_array().unwrap().len(), 2);

        let outputs = execute(&api, &ManagerOperation::DeploymentOutputs {
            deployment_id: "dep".to_string(),
        })
        .unwrap();
        assert_eq!(outputs["endpoint"], "10.0.0.1");

        let secret = execute(&api, &ManagerOperation::GetSecret {
            key: "agent_key".to_string(),
        })
        .unwrap();
        assert_eq!(secret["value"], "secret");
    }

    #[test]
    fn test_execute_propagates_errors() {
        let result = execute(&manager(), &ManagerOperation::GetSecret {
            key: "missing".to_string(),
        });
        assert!(matches!(
            result,
            Err(crate::error::EcopackError::ManagerApi { status: 404, .. })
        ));
    }

    #[test]
    fn test_resources_by_node_type_with_exclusions() {
        let api = manager();
        let resources = deployment_resources_by_node_type(
            &api,
            "dep",
            "cloudify.nodes.aws.ec2",
            &["SecurityGroup".to_string()],
        )
        .unwrap();

        let ids: Vec<_> = resources.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["vm", "vpc"]);
        assert_eq!(resources[0].instances.len(), 2);
    }

    #[test]
    fn test_resource_names_fall_back_to_external_id() {
        let api = manager();
        let lookup = NameLookup {
            name_property: "aws_resource_id",
            external_resource_key: DEFAULT_EXTERNAL_RESOURCE_KEY,
            resource_id_key: DEFAULT_RESOURCE_ID_KEY,
        };
        let names =
            deployment_resource_names(&api, "dep", "cloudify.nodes.aws.ec2", &[], &lookup).unwrap();

        assert_eq!(
            names,
            vec![
                Some("i-abc".to_string()),
                None,
                Some("vpc-123".to_string()),
                Some("sg-1".to_string()),
            ]
        );
    }

    #[test]
    fn test_client_requires_host() {
        let result = ManagerClient::new(&ManagerConfig::default());
        assert!(matches!(
            result,
            Err(crate::error::EcopackError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn test_client_base_url() {
        let config = ManagerConfig {
            host: Some("10.0.0.5".to_string()),
            ..ManagerConfig::default()
        };
        let client = ManagerClient::new(&config).unwrap();
        assert_eq!(client.base_url, "https://10.0.0.5/api/v3.1");
    }
}
