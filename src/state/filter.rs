//! Current state filtering
//!
//! Removes interfaces (and the routes going through them) that the operator
//! excluded with the interfaces filter, and strips linux-bridge timers that
//! change on their own. The result is what gets stored in
//! `NodeNetworkState` and compared against the desired state.

use std::fmt;

use glob::{Pattern, PatternError};
use serde_yaml::{Mapping, Value};
use tracing::{debug, instrument};

use super::tree::{get_mapping_mut, get_sequence_mut, get_str};
use crate::error::{Error, Result};

/// Interface type whose bridge options carry volatile timers
pub const LINUX_BRIDGE: &str = "linux-bridge";

/// Bridge options that tick independently of the configuration
pub const VOLATILE_BRIDGE_OPTIONS: [&str; 2] = ["gc-timer", "hello-timer"];

/// Route tables reported by nmstate
pub const ROUTE_KINDS: [&str; 2] = ["running", "config"];

/// Compiled glob for interface names excluded from the reported state
///
/// Besides the `*`, `?` and `[...]` wildcards, `{a,b}` alternation is
/// accepted (nested groups too); each alternative is compiled as its own
/// pattern and a name is excluded when any of them matches.
#[derive(Clone, Debug)]
pub struct InterfaceFilter {
    source: String,
    patterns: Vec<Pattern>,
}

impl InterfaceFilter {
    pub fn new(pattern: &str) -> Result<Self> {
        let invalid = |source| Error::InvalidFilterPattern {
            pattern: pattern.to_string(),
            source,
        };

        let patterns = expand_alternatives(pattern)
            .map_err(invalid)?
            .iter()
            .map(|alternative| Pattern::new(alternative))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(invalid)?;

        Ok(Self {
            source: pattern.to_string(),
            patterns,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(name))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for InterfaceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expand the first `{...}` group of `pattern` and recurse into each result.
///
/// Braces inside a `[...]` class are literal. An unbalanced brace is an
/// error rather than a literal so a mistyped filter fails at startup.
fn expand_alternatives(pattern: &str) -> std::result::Result<Vec<String>, PatternError> {
    let Some(open) = find_unclassed(pattern, 0, |c| c == '{' || c == '}') else {
        return Ok(vec![pattern.to_string()]);
    };
    if pattern[open..].starts_with('}') {
        return Err(PatternError {
            pos: open,
            msg: "unmatched closing brace",
        });
    }

    let mut depth = 0;
    let mut start = open + 1;
    let mut alternatives = Vec::new();
    let mut cursor = open;
    loop {
        let Some(pos) = find_unclassed(pattern, cursor + 1, |c| matches!(c, '{' | '}' | ','))
        else {
            return Err(PatternError {
                pos: open,
                msg: "unclosed brace",
            });
        };
        match &pattern[pos..pos + 1] {
            "{" => depth += 1,
            "}" if depth > 0 => depth -= 1,
            "}" => {
                alternatives.push(&pattern[start..pos]);
                let (prefix, suffix) = (&pattern[..open], &pattern[pos + 1..]);
                let mut expanded = Vec::new();
                for alternative in alternatives {
                    expanded.extend(expand_alternatives(&format!(
                        "{prefix}{alternative}{suffix}"
                    ))?);
                }
                return Ok(expanded);
            }
            _ if depth == 0 => {
                alternatives.push(&pattern[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
        cursor = pos;
    }
}

/// Byte offset of the first char at or after `from` that satisfies `wanted`,
/// skipping over `[...]` character classes.
fn find_unclassed(pattern: &str, from: usize, wanted: impl Fn(char) -> bool) -> Option<usize> {
    let mut chars = pattern[from..].char_indices().map(|(i, c)| (i + from, c));
    while let Some((pos, c)) = chars.next() {
        if c == '[' {
            // `[]...]` and `[!]...]` start with a literal `]`
            let mut first = true;
            for (_, c) in chars.by_ref() {
                match c {
                    '!' if first => continue,
                    ']' if !first => break,
                    _ => first = false,
                }
            }
        } else if wanted(c) {
            return Some(pos);
        }
    }
    None
}

/// What a filter pass removed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub interfaces_removed: usize,
    pub routes_removed: usize,
    pub volatile_fields_removed: usize,
}

impl FilterStats {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Filter a current state YAML document and serialize it back.
pub fn filter_out(current_state: &str, filter: &InterfaceFilter) -> Result<String> {
    filter_out_with_stats(current_state, filter).map(|(state, _)| state)
}

#[instrument(skip_all, fields(filter = %filter))]
pub fn filter_out_with_stats(
    current_state: &str,
    filter: &InterfaceFilter,
) -> Result<(String, FilterStats)> {
    let mut state: Value = if current_state.trim().is_empty() {
        Value::Null
    } else {
        serde_yaml::from_str(current_state).map_err(Error::StateParseError)?
    };

    let stats = filter_document(&mut state, filter)?;
    let filtered = serde_yaml::to_string(&state).map_err(Error::StateSerializeError)?;

    debug!(
        interfaces_removed = stats.interfaces_removed,
        routes_removed = stats.routes_removed,
        volatile_fields_removed = stats.volatile_fields_removed,
        "Filtered current state"
    );

    Ok((filtered, stats))
}

/// Filter an already parsed document in place.
///
/// The top level must be a mapping; an empty document is treated as an empty
/// mapping. Anything below the top level that does not have the expected
/// shape is left untouched.
pub fn filter_document(state: &mut Value, filter: &InterfaceFilter) -> Result<FilterStats> {
    if state.is_null() {
        *state = Value::Mapping(Mapping::new());
    }
    if !state.is_mapping() {
        return Err(Error::StateShapeError(format!(
            "expected a mapping at the top level, found {}",
            value_kind(state)
        )));
    }

    let mut stats = FilterStats::default();
    filter_out_interfaces(state, filter, &mut stats);
    for kind in ROUTE_KINDS {
        filter_out_routes(kind, state, filter, &mut stats);
    }

    Ok(stats)
}

fn filter_out_interfaces(state: &mut Value, filter: &InterfaceFilter, stats: &mut FilterStats) {
    let Some(interfaces) = get_sequence_mut(state, "interfaces") else {
        return;
    };

    let before = interfaces.len();
    interfaces.retain(|iface| !get_str(iface, "name").is_some_and(|name| filter.matches(name)));
    stats.interfaces_removed += before - interfaces.len();

    for iface in interfaces.iter_mut() {
        stats.volatile_fields_removed += filter_out_dynamic_attributes(iface);
    }
}

/// Strip the linux-bridge timers found under `bridge.options`:
///
/// ```yaml
/// - name: br1
///   type: linux-bridge
///   bridge:
///     options:
///       gc-timer: 13715
///       hello-timer: 0
/// ```
fn filter_out_dynamic_attributes(iface: &mut Value) -> usize {
    if get_str(iface, "type") != Some(LINUX_BRIDGE) {
        return 0;
    }

    let Some(bridge) = get_mapping_mut(iface, "bridge") else {
        return 0;
    };
    let Some(options) = bridge.get_mut("options").and_then(Value::as_mapping_mut) else {
        return 0;
    };

    VOLATILE_BRIDGE_OPTIONS
        .iter()
        .filter(|option| options.shift_remove(**option).is_some())
        .count()
}

fn filter_out_routes(
    kind: &str,
    state: &mut Value,
    filter: &InterfaceFilter,
    stats: &mut FilterStats,
) {
    let Some(routes) = get_mapping_mut(state, "routes") else {
        return;
    };
    let Some(routes_by_kind) = routes.get_mut(kind).and_then(Value::as_sequence_mut) else {
        return;
    };

    let before = routes_by_kind.len();
    routes_by_kind.retain(|route| {
        !get_str(route, "next-hop-interface").is_some_and(|name| filter.matches(name))
    });
    stats.routes_removed += before - routes_by_kind.len();
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
