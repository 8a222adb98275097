//! Status reporting for the nmstate handler
//!
//! Glue between the reconcile loop and the diagnostics/state engines: the
//! enactment conditions and the NodeNetworkState status it writes.

pub mod conditions;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod node_state;

pub use conditions::{
    failure_details, find_condition, is_condition_true, set_failed_to_configure, set_matching,
    set_node_selector_not_matching, set_progressing, set_success,
};
pub use node_state::current_state_status;
