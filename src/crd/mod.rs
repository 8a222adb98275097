//! Custom Resource Definitions for the nmstate handler
//!
//! Only the status-bearing resources the handler writes to are defined here.

mod enactment;
mod node_network_state;
pub mod types;


pub use enactment::{
    enactment_name, NodeNetworkConfigurationEnactment, NodeNetworkConfigurationEnactmentSpec,
    NodeNetworkConfigurationEnactmentStatus,
};
pub use node_network_state::{NodeNetworkState, NodeNetworkStateSpec, NodeNetworkStateStatus};
pub use types::*;
