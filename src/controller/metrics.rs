//! Prometheus metrics for the nmstate handler
//!
//! # Exported metrics
//! When built with `--features metrics` the registry holds:
//! - `nmstate_filtered_interfaces_total` (counter): interfaces dropped by the interfaces filter, labeled by node.
//! - `nmstate_filtered_routes_total` (counter): routes dropped by the interfaces filter, labeled by node.
//! - `nmstate_state_filter_errors_total` (counter): current states reported unfiltered, labeled by node and error kind.
//! - `nmstate_failure_messages_total` (counter): formatted nmstatectl failures, labeled by whether the original output was attached.
//!
//! The `nmstate-handler` binary is one-shot and never serves these. A
//! long-running controller embedding the crate exposes them by serving
//! [`encode_registry`] on its metrics endpoint.

use std::sync::atomic::AtomicU64;

use once_cell::sync::Lazy;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

use crate::state::FilterStats;

/// Labels for per-node metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct NodeLabels {
    pub node: String,
}

/// Labels for filter error metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct FilterErrorLabels {
    pub node: String,
    /// Error kind, e.g. "parse", "shape"
    pub kind: String,
}

/// Labels for failure message metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct FailureMessageLabels {
    /// "true" when the compressed original output was appended
    pub payload: String,
}

pub static FILTERED_INTERFACES_TOTAL: Lazy<Family<NodeLabels, Counter<u64, AtomicU64>>> =
    Lazy::new(Family::default);

pub static FILTERED_ROUTES_TOTAL: Lazy<Family<NodeLabels, Counter<u64, AtomicU64>>> =
    Lazy::new(Family::default);

pub static STATE_FILTER_ERRORS_TOTAL: Lazy<Family<FilterErrorLabels, Counter<u64, AtomicU64>>> =
    Lazy::new(Family::default);

pub static FAILURE_MESSAGES_TOTAL: Lazy<Family<FailureMessageLabels, Counter<u64, AtomicU64>>> =
    Lazy::new(Family::default);

/// Global registry holding every handler metric
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let mut registry = Registry::default();

    registry.register(
        "nmstate_filtered_interfaces",
        "Total number of interfaces removed from reported current states",
        FILTERED_INTERFACES_TOTAL.clone(),
    );
    registry.register(
        "nmstate_filtered_routes",
        "Total number of routes removed from reported current states",
        FILTERED_ROUTES_TOTAL.clone(),
    );
    registry.register(
        "nmstate_state_filter_errors",
        "Total number of current states reported without filtering",
        STATE_FILTER_ERRORS_TOTAL.clone(),
    );
    registry.register(
        "nmstate_failure_messages",
        "Total number of formatted nmstatectl failure messages",
        FAILURE_MESSAGES_TOTAL.clone(),
    );

    registry
});

/// Record what a filter pass removed for `node`
pub fn observe_filter_stats(node: &str, stats: &FilterStats) {
    let labels = NodeLabels {
        node: node.to_string(),
    };
    FILTERED_INTERFACES_TOTAL
        .get_or_create(&labels)
        .inc_by(stats.interfaces_removed as u64);
    FILTERED_ROUTES_TOTAL
        .get_or_create(&labels)
        .inc_by(stats.routes_removed as u64);
}

/// Increment the filter error counter
pub fn inc_state_filter_error(node: &str, kind: &str) {
    let labels = FilterErrorLabels {
        node: node.to_string(),
        kind: kind.to_string(),
    };
    STATE_FILTER_ERRORS_TOTAL.get_or_create(&labels).inc();
}

/// Increment the formatted failure counter
pub fn inc_failure_message(with_payload: bool) {
    let labels = FailureMessageLabels {
        payload: with_payload.to_string(),
    };
    FAILURE_MESSAGES_TOTAL.get_or_create(&labels).inc();
}

/// Render the registry in the OpenMetrics text format
pub fn encode_registry() -> Result<String, std::fmt::Error> {
    let mut buffer = String::new();
    prometheus_client::encoding::text::encode(&mut buffer, &REGISTRY)?;
    Ok(buffer)
}
