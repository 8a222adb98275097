//! Error message formatting for enactment status
//!
//! nmstatectl failures carry python tracebacks, debug logs and sometimes a
//! complete YAML dump of the current state. The normalizer keeps only the
//! content lines, splits them into an indented breadcrumb on `": "`, and
//! appends the compressed original so nothing is lost.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::classifier::next_kept;
use super::codec;

/// `failed to execute nmstatectl ... --timeout N: 'exit status N' '' '<stderr>`
static COMMAND_FAILURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(.*--timeout \d+: 'exit status \d+') '{2}\s'").unwrap());

const SEGMENT_DELIMITER: &str = ": ";
const INDENT: &str = "  ";

/// A formatted error message and the encoded original it was built from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedMessage {
    /// Breadcrumb lines, each terminated by a newline
    pub summary: String,
    /// Compressed original message, absent when the summary is empty or
    /// compression failed
    pub payload: Option<String>,
}

impl NormalizedMessage {
    pub fn from_raw(raw: &str) -> Self {
        let lines: Vec<&str> = raw.split('\n').collect();
        let mut summary = String::new();
        let mut cursor = 0;

        if let Some(failure) = lines.first().and_then(|line| COMMAND_FAILURE.captures(line)) {
            summary.push_str(failure[1].trim_end_matches(' '));
            summary.push('\n');
            cursor += 1;
        }

        cursor = next_kept(&lines, cursor);
        while cursor < lines.len() {
            push_breadcrumb(&mut summary, lines[cursor]);
            cursor = next_kept(&lines, cursor + 1);
        }

        // A message made only of noise stays empty, payload included
        let payload = if summary.is_empty() {
            None
        } else {
            match codec::encode(raw) {
                Ok(token) => Some(token),
                Err(e) => {
                    warn!("Dropping encoded error payload: {}", e);
                    None
                }
            }
        };

        debug!(
            raw_len = raw.len(),
            summary_len = summary.len(),
            has_payload = payload.is_some(),
            "Formatted error message"
        );

        Self { summary, payload }
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.payload.is_none()
    }
}

impl fmt::Display for NormalizedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)?;
        if let Some(payload) = &self.payload {
            write!(f, "\n{}", payload)?;
        }
        Ok(())
    }
}

fn push_breadcrumb(out: &mut String, line: &str) {
    for (depth, segment) in line
        .trim_end_matches(' ')
        .split(SEGMENT_DELIMITER)
        .enumerate()
    {
        for _ in 0..depth {
            out.push_str(INDENT);
        }
        out.push_str(segment);
        out.push('\n');
    }
}

/// Format raw nmstatectl output into a short status message.
pub fn normalize(raw: &str) -> String {
    NormalizedMessage::from_raw(raw).to_string()
}

/// Recover the original output from a message produced by [`normalize`].
///
/// Returns an empty string when the message carries no payload or the
/// payload is malformed.
pub fn original_message(status_message: &str) -> String {
    match status_message.rsplit_once("\n\n") {
        Some((_, payload)) => codec::decode(payload),
        None => String::new(),
    }
}
