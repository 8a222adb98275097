//! NodeNetworkConfigurationEnactment Custom Resource Definition
//!
//! An enactment records one policy being applied on one node. Failures of
//! `nmstatectl set` end up, formatted, in its `Failing` condition.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::Condition;

#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "nmstate.io",
    version = "v1beta1",
    kind = "NodeNetworkConfigurationEnactment",
    status = "NodeNetworkConfigurationEnactmentStatus",
    shortname = "nnce",
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.conditions[?(@.status=='True')].type"}"#,
    printcolumn = r#"{"name":"Reason","type":"string","jsonPath":".status.conditions[?(@.status=='True')].reason"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct NodeNetworkConfigurationEnactmentSpec {
    pub node_name: String,
    pub policy_name: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeNetworkConfigurationEnactmentStatus {
    /// Desired state rendered for this node
    #[serde(default)]
    pub desired_state: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

/// Name of the enactment for `policy` on `node`
pub fn enactment_name(node: &str, policy: &str) -> String {
    format!("{}.{}", node, policy)
}

impl NodeNetworkConfigurationEnactment {
    pub fn for_policy(node: &str, policy: &str) -> Self {
        let mut enactment = Self::new(
            &enactment_name(node, policy),
            NodeNetworkConfigurationEnactmentSpec {
                node_name: node.to_string(),
                policy_name: policy.to_string(),
            },
        );
        enactment.status = Some(NodeNetworkConfigurationEnactmentStatus::default());
        enactment
    }
}
