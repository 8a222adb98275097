//! NodeNetworkState Custom Resource Definition
//!
//! One NodeNetworkState exists per node. Its status carries the node's
//! current network state as reported by `nmstatectl show`, after filtering.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::Condition;

#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "nmstate.io",
    version = "v1beta1",
    kind = "NodeNetworkState",
    status = "NodeNetworkStateStatus",
    shortname = "nns",
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct NodeNetworkStateSpec {
    /// Name of the node this state belongs to
    pub node_name: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeNetworkStateStatus {
    /// Filtered current state, as nmstate YAML
    #[serde(default)]
    pub current_state: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_successful_update_time: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}
