//! NodeNetworkState status reporting
//!
//! Builds the status written after each `nmstatectl show`. The raw capture is
//! filtered first; when that fails the unfiltered capture is reported instead
//! so the node's state is never left stale.

use chrono::Utc;
use tracing::{info, instrument, warn};

use super::conditions::{
    set_condition, CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_AVAILABLE,
};
use crate::crd::NodeNetworkStateStatus;
use crate::state::{filter_out_with_stats, InterfaceFilter};

pub const REASON_FILTERED: &str = "Filtered";
pub const REASON_FILTER_FAILED: &str = "FilterFailed";

/// Build the NodeNetworkState status for `node` from a raw current state capture.
#[instrument(skip(current_state, filter), fields(filter = %filter))]
pub fn current_state_status(
    node: &str,
    current_state: &str,
    filter: &InterfaceFilter,
) -> NodeNetworkStateStatus {
    let mut status = NodeNetworkStateStatus {
        last_successful_update_time: Some(Utc::now().to_rfc3339()),
        ..Default::default()
    };

    match filter_out_with_stats(current_state, filter) {
        Ok((filtered, stats)) => {
            #[cfg(feature = "metrics")]
            super::metrics::observe_filter_stats(node, &stats);

            if !stats.is_noop() {
                info!(
                    interfaces_removed = stats.interfaces_removed,
                    routes_removed = stats.routes_removed,
                    "Filtered current state of node {}",
                    node
                );
            }
            status.current_state = filtered;
            set_condition(
                &mut status.conditions,
                CONDITION_TYPE_AVAILABLE,
                CONDITION_STATUS_TRUE,
                REASON_FILTERED,
                "",
            );
        }
        Err(e) => {
            warn!(
                "Reporting unfiltered current state of node {}: {}",
                node, e
            );
            #[cfg(feature = "metrics")]
            super::metrics::inc_state_filter_error(node, e.kind());

            status.current_state = current_state.to_string();
            set_condition(
                &mut status.conditions,
                CONDITION_TYPE_AVAILABLE,
                CONDITION_STATUS_FALSE,
                REASON_FILTER_FAILED,
                &e.to_string(),
            );
        }
    }

    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::conditions::find_condition;

    const CAPTURE: &str = "interfaces:\n- name: eth0\n  type: ethernet\n- name: veth12ab\n  type: veth\nroutes:\n  running:\n  - next-hop-interface: veth12ab\n";

    fn veth_filter() -> InterfaceFilter {
        InterfaceFilter::new("veth*").unwrap()
    }

    #[test]
    fn test_current_state_is_filtered() {
        let status = current_state_status("node-state-filtered", CAPTURE, &veth_filter());

        assert!(status.current_state.contains("eth0"));
        assert!(!status.current_state.contains("veth12ab"));
        assert!(status.last_successful_update_time.is_some());

        let available = find_condition(&status.conditions, CONDITION_TYPE_AVAILABLE).unwrap();
        assert_eq!(available.status, CONDITION_STATUS_TRUE);
        assert_eq!(available.reason, REASON_FILTERED);
    }

    #[test]
    fn test_falls_back_to_unfiltered_state() {
        let capture = "- not\n- a mapping\n";
        let status = current_state_status("node-state-fallback", capture, &veth_filter());

        assert_eq!(status.current_state, capture);

        let available = find_condition(&status.conditions, CONDITION_TYPE_AVAILABLE).unwrap();
        assert_eq!(available.status, CONDITION_STATUS_FALSE);
        assert_eq!(available.reason, REASON_FILTER_FAILED);
        assert!(available.message.contains("mapping"));
    }
}
