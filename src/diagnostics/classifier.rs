//! Line classification for nmstatectl error output
//!
//! Each line is checked against an ordered list of predicates. The first
//! match decides the class; the order is part of the contract (a traceback
//! header must win over keyword matching, for instance).

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

static TRACEBACK_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*Traceback\s\(most\srecent\scall\slast\):").unwrap());

static TRACEBACK_FRAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*File "\S*",\sline\s\d*,\sin"#).unwrap());

static TIMESTAMPED_LOG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d{4}-\d{2}-\d{2}\s\d{2}:\d{2}:\d{2}").unwrap());

static UNHANDLED_NOTICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Unhandled\s.*\sfor\s").unwrap());

static STATE_DUMP_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"->\scurrentState:\s---").unwrap());

/// Log level markers and python warnings emitted by nmstate
pub const NOISE_KEYWORDS: [&str; 4] = ["DEBUG", "WARNING", "UserWarning:", "warnings.warn("];

/// Why a line is discarded, or `Keep` if it is content
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineClass {
    Blank,
    QuoteOnly,
    TracebackHeader,
    TracebackFrame,
    TimestampedLog,
    UnhandledNotice,
    NoiseKeyword,
    StateDumpMarker,
    Keep,
}

type Predicate = fn(&str) -> Option<LineClass>;

/// Single-line predicates in priority order
const PREDICATES: [Predicate; 6] = [
    blank_or_quote,
    traceback_header,
    timestamped_log,
    unhandled_notice,
    noise_keyword,
    state_dump_marker,
];

fn blank_or_quote(line: &str) -> Option<LineClass> {
    match line.trim_matches(|c| c == ':' || c == ' ') {
        "" => Some(LineClass::Blank),
        "'" => Some(LineClass::QuoteOnly),
        _ => None,
    }
}

fn traceback_header(line: &str) -> Option<LineClass> {
    TRACEBACK_HEADER
        .is_match(line)
        .then_some(LineClass::TracebackHeader)
}

fn timestamped_log(line: &str) -> Option<LineClass> {
    TIMESTAMPED_LOG
        .is_match(line)
        .then_some(LineClass::TimestampedLog)
}

fn unhandled_notice(line: &str) -> Option<LineClass> {
    UNHANDLED_NOTICE
        .is_match(line)
        .then_some(LineClass::UnhandledNotice)
}

fn noise_keyword(line: &str) -> Option<LineClass> {
    NOISE_KEYWORDS
        .iter()
        .any(|keyword| line.contains(keyword))
        .then_some(LineClass::NoiseKeyword)
}

fn state_dump_marker(line: &str) -> Option<LineClass> {
    STATE_DUMP_MARKER
        .is_match(line)
        .then_some(LineClass::StateDumpMarker)
}

/// Classify a single line.
///
/// Never returns `TracebackFrame`: frames are only recognised right after a
/// traceback header, see [`next_kept`].
pub fn classify(line: &str) -> LineClass {
    PREDICATES
        .iter()
        .find_map(|predicate| predicate(line))
        .unwrap_or(LineClass::Keep)
}

/// True for the `File "...", line N, in ...` line of a python stack frame
pub fn is_traceback_frame(line: &str) -> bool {
    TRACEBACK_FRAME.is_match(line)
}

/// Return the index of the next line to keep at or after `cursor`, or
/// `lines.len()` when nothing is left to keep.
pub fn next_kept<S: AsRef<str>>(lines: &[S], mut cursor: usize) -> usize {
    while let Some(line) = lines.get(cursor).map(|line| line.as_ref()) {
        let class = classify(line);
        match class {
            LineClass::Keep => return cursor,
            LineClass::TracebackHeader => {
                trace!(cursor, ?class, "discarding line");
                cursor += 1;
                // A frame is the location line plus the source line under it
                while lines
                    .get(cursor)
                    .is_some_and(|frame| is_traceback_frame(frame.as_ref()))
                {
                    trace!(cursor, class = ?LineClass::TracebackFrame, "discarding frame");
                    cursor += 2;
                }
            }
            LineClass::StateDumpMarker => {
                trace!(cursor, ?class, remaining = lines.len() - cursor, "discarding state dump");
                return lines.len();
            }
            _ => {
                trace!(cursor, ?class, "discarding line");
                cursor += 1;
            }
        }
    }

    lines.len()
}
