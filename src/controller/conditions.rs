//! Enactment condition management following Kubernetes API conventions

use chrono::Utc;

use crate::crd::Condition;
use crate::diagnostics::{original_message, NormalizedMessage};

/// Enactment condition types
pub const CONDITION_TYPE_FAILING: &str = "Failing";
pub const CONDITION_TYPE_AVAILABLE: &str = "Available";
pub const CONDITION_TYPE_PROGRESSING: &str = "Progressing";
pub const CONDITION_TYPE_MATCHING: &str = "Matching";

/// Standard condition statuses
pub const CONDITION_STATUS_TRUE: &str = "True";
pub const CONDITION_STATUS_FALSE: &str = "False";
pub const CONDITION_STATUS_UNKNOWN: &str = "Unknown";

/// Condition reasons
pub const REASON_FAILED_TO_CONFIGURE: &str = "FailedToConfigure";
pub const REASON_SUCCESSFULLY_CONFIGURED: &str = "SuccessfullyConfigured";
pub const REASON_CONFIGURATION_PROGRESSING: &str = "ConfigurationProgressing";
pub const REASON_NODE_SELECTOR_NOT_MATCHING: &str = "NodeSelectorNotMatching";
pub const REASON_NODE_SELECTOR_ALL_LABELS_MATCHING: &str = "NodeSelectorAllLabelsMatching";

/// Update or add a condition to the conditions list
///
/// The transition time only moves when the status changes.
pub fn set_condition(
    conditions: &mut Vec<Condition>,
    type_: &str,
    status: &str,
    reason: &str,
    message: &str,
) {
    let now = Utc::now().to_rfc3339();

    if let Some(existing) = conditions.iter_mut().find(|c| c.type_ == type_) {
        let should_update_time = existing.status != status;

        existing.status = status.to_string();
        existing.reason = reason.to_string();
        existing.message = message.to_string();

        if should_update_time {
            existing.last_transition_time = now;
        }
    } else {
        conditions.push(Condition {
            type_: type_.to_string(),
            status: status.to_string(),
            last_transition_time: now,
            reason: reason.to_string(),
            message: message.to_string(),
            observed_generation: None,
        });
    }
}

/// Find a condition by type
pub fn find_condition<'a>(conditions: &'a [Condition], type_: &str) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.type_ == type_)
}

/// Check if a condition is true
pub fn is_condition_true(conditions: &[Condition], type_: &str) -> bool {
    find_condition(conditions, type_)
        .map(|c| c.status == CONDITION_STATUS_TRUE)
        .unwrap_or(false)
}

/// Remove a condition by type
pub fn remove_condition(conditions: &mut Vec<Condition>, type_: &str) {
    conditions.retain(|c| c.type_ != type_);
}

/// Desired state is being applied
pub fn set_progressing(conditions: &mut Vec<Condition>, message: &str) {
    let reason = REASON_CONFIGURATION_PROGRESSING;
    set_condition(conditions, CONDITION_TYPE_FAILING, CONDITION_STATUS_UNKNOWN, reason, "");
    set_condition(conditions, CONDITION_TYPE_AVAILABLE, CONDITION_STATUS_UNKNOWN, reason, "");
    set_condition(conditions, CONDITION_TYPE_PROGRESSING, CONDITION_STATUS_TRUE, reason, message);
}

/// nmstatectl failed; `output` is its raw combined output.
///
/// The Failing message is the formatted error with the original output
/// attached, see [`failure_details`].
pub fn set_failed_to_configure(conditions: &mut Vec<Condition>, output: &str) {
    let normalized = NormalizedMessage::from_raw(output);
    #[cfg(feature = "metrics")]
    super::metrics::inc_failure_message(normalized.payload.is_some());

    let message = normalized.to_string();
    let reason = REASON_FAILED_TO_CONFIGURE;
    set_condition(conditions, CONDITION_TYPE_FAILING, CONDITION_STATUS_TRUE, reason, &message);
    set_condition(conditions, CONDITION_TYPE_AVAILABLE, CONDITION_STATUS_FALSE, reason, "");
    set_condition(conditions, CONDITION_TYPE_PROGRESSING, CONDITION_STATUS_FALSE, reason, "");
}

pub fn set_success(conditions: &mut Vec<Condition>, message: &str) {
    let reason = REASON_SUCCESSFULLY_CONFIGURED;
    set_condition(conditions, CONDITION_TYPE_FAILING, CONDITION_STATUS_FALSE, reason, "");
    set_condition(conditions, CONDITION_TYPE_AVAILABLE, CONDITION_STATUS_TRUE, reason, message);
    set_condition(conditions, CONDITION_TYPE_PROGRESSING, CONDITION_STATUS_FALSE, reason, "");
}

/// The policy's node selector does not select this node
pub fn set_node_selector_not_matching(conditions: &mut Vec<Condition>, message: &str) {
    let reason = REASON_NODE_SELECTOR_NOT_MATCHING;
    set_condition(conditions, CONDITION_TYPE_FAILING, CONDITION_STATUS_FALSE, reason, "");
    set_condition(conditions, CONDITION_TYPE_AVAILABLE, CONDITION_STATUS_FALSE, reason, "");
    set_condition(conditions, CONDITION_TYPE_PROGRESSING, CONDITION_STATUS_FALSE, reason, "");
    set_condition(conditions, CONDITION_TYPE_MATCHING, CONDITION_STATUS_FALSE, reason, message);
}

pub fn set_matching(conditions: &mut Vec<Condition>) {
    set_condition(
        conditions,
        CONDITION_TYPE_MATCHING,
        CONDITION_STATUS_TRUE,
        REASON_NODE_SELECTOR_ALL_LABELS_MATCHING,
        "All policy selectors are matching the node",
    );
}

/// Full nmstatectl output behind a Failing condition, if there is one.
pub fn failure_details(conditions: &[Condition]) -> Option<String> {
    let failing = find_condition(conditions, CONDITION_TYPE_FAILING)
        .filter(|c| c.status == CONDITION_STATUS_TRUE)?;
    let details = original_message(&failing.message);
    (!details.is_empty()).then_some(details)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NMSTATECTL_FAILURE: &str = "      Traceback (most recent call last):\n        File \"/usr/bin/nmstatectl\", line 11, in <module>\n          load_entry_point('nmstate==0.3.6', 'console_scripts', 'nmstatectl')()\n      libnmstate.error.NmstateValueError: Interface bond1 has unknown slave: eth10\n";

    fn status_of<'a>(conditions: &'a [Condition], type_: &str) -> &'a str {
        &find_condition(conditions, type_).unwrap().status
    }

    #[test]
    fn test_set_condition_adds_new() {
        let mut conditions = Vec::new();
        set_condition(
            &mut conditions,
            CONDITION_TYPE_AVAILABLE,
            CONDITION_STATUS_TRUE,
            REASON_SUCCESSFULLY_CONFIGURED,
            "successfully reconciled",
        );

        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].type_, CONDITION_TYPE_AVAILABLE);
        assert_eq!(conditions[0].status, CONDITION_STATUS_TRUE);
    }

    #[test]
    fn test_set_condition_updates_existing() {
        let mut conditions = vec![Condition {
            type_: CONDITION_TYPE_AVAILABLE.to_string(),
            status: CONDITION_STATUS_FALSE.to_string(),
            last_transition_time: "2024-01-01T00:00:00Z".to_string(),
            reason: REASON_FAILED_TO_CONFIGURE.to_string(),
            message: String::new(),
            observed_generation: None,
        }];

        let old_time = conditions[0].last_transition_time.clone();
        set_condition(
            &mut conditions,
            CONDITION_TYPE_AVAILABLE,
            CONDITION_STATUS_TRUE,
            REASON_SUCCESSFULLY_CONFIGURED,
            "successfully reconciled",
        );

        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].status, CONDITION_STATUS_TRUE);
        assert_ne!(conditions[0].last_transition_time, old_time);
    }

    #[test]
    fn test_set_condition_keeps_time_when_status_unchanged() {
        let mut conditions = vec![Condition {
            type_: CONDITION_TYPE_PROGRESSING.to_string(),
            status: CONDITION_STATUS_TRUE.to_string(),
            last_transition_time: "2024-01-01T00:00:00Z".to_string(),
            reason: REASON_CONFIGURATION_PROGRESSING.to_string(),
            message: "Applying desired state".to_string(),
            observed_generation: None,
        }];

        set_progressing(&mut conditions, "Still applying");

        let progressing = find_condition(&conditions, CONDITION_TYPE_PROGRESSING).unwrap();
        assert_eq!(progressing.last_transition_time, "2024-01-01T00:00:00Z");
        assert_eq!(progressing.message, "Still applying");
    }

    #[test]
    fn test_set_progressing() {
        let mut conditions = Vec::new();
        set_progressing(&mut conditions, "Applying desired state");

        assert_eq!(status_of(&conditions, CONDITION_TYPE_FAILING), CONDITION_STATUS_UNKNOWN);
        assert_eq!(status_of(&conditions, CONDITION_TYPE_AVAILABLE), CONDITION_STATUS_UNKNOWN);
        assert!(is_condition_true(&conditions, CONDITION_TYPE_PROGRESSING));
    }

    #[test]
    fn test_set_failed_to_configure_formats_message() {
        let mut conditions = Vec::new();
        set_progressing(&mut conditions, "Applying desired state");
        set_failed_to_configure(&mut conditions, NMSTATECTL_FAILURE);

        assert!(is_condition_true(&conditions, CONDITION_TYPE_FAILING));
        assert!(!is_condition_true(&conditions, CONDITION_TYPE_AVAILABLE));
        assert!(!is_condition_true(&conditions, CONDITION_TYPE_PROGRESSING));

        let failing = find_condition(&conditions, CONDITION_TYPE_FAILING).unwrap();
        assert_eq!(failing.reason, REASON_FAILED_TO_CONFIGURE);
        assert!(failing.message.starts_with(
            "      libnmstate.error.NmstateValueError\n  Interface bond1 has unknown slave\n    eth10\n\n"
        ));
        assert!(!failing.message.contains("Traceback"));
    }

    #[test]
    fn test_failure_details_recovers_output() {
        let mut conditions = Vec::new();
        set_failed_to_configure(&mut conditions, NMSTATECTL_FAILURE);

        assert_eq!(
            failure_details(&conditions).as_deref(),
            Some(NMSTATECTL_FAILURE)
        );
    }

    #[test]
    fn test_failure_details_absent_after_success() {
        let mut conditions = Vec::new();
        set_failed_to_configure(&mut conditions, NMSTATECTL_FAILURE);
        set_success(&mut conditions, "successfully reconciled");

        assert!(failure_details(&conditions).is_none());
        assert!(is_condition_true(&conditions, CONDITION_TYPE_AVAILABLE));
        assert_eq!(status_of(&conditions, CONDITION_TYPE_FAILING), CONDITION_STATUS_FALSE);
    }

    #[test]
    fn test_node_selector_conditions() {
        let mut conditions = Vec::new();
        set_node_selector_not_matching(&mut conditions, "Unmatching labels: kubernetes.io/hostname");
        assert_eq!(conditions.len(), 4);
        assert!(!is_condition_true(&conditions, CONDITION_TYPE_MATCHING));

        set_matching(&mut conditions);
        assert!(is_condition_true(&conditions, CONDITION_TYPE_MATCHING));
        assert_eq!(conditions.len(), 4);
    }

    #[test]
    fn test_remove_condition() {
        let mut conditions = Vec::new();
        set_matching(&mut conditions);
        remove_condition(&mut conditions, CONDITION_TYPE_MATCHING);
        assert!(find_condition(&conditions, CONDITION_TYPE_MATCHING).is_none());
    }
}
