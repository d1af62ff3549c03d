//! Log record to HTML line rendering.
//!
//! Every log view (follow and tail) runs its lines through a [`LineFormatter`]
//! that carries two pieces of state across lines: the last calendar date shown,
//! so a separator is emitted only when the day changes, and the last timestamp
//! seen, which lines that are not valid JSON inherit.

mod levels;

pub use levels::{LevelTable, Severity};

use chrono::{DateTime, Local};
use serde::Deserialize;
use std::fmt::Write;

/// One line of a per-test log file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogRecord {
    pub level: String,
    pub message: String,
    pub name: String,
    /// Unix seconds with a fractional part.
    pub time: f64,
}

impl LogRecord {
    /// Stand-in for a line that is not a log record.
    fn fallback(raw: &str, last_time: f64) -> Self {
        Self {
            level: "INFO".to_string(),
            message: raw.to_string(),
            name: "unknown".to_string(),
            time: last_time,
        }
    }
}

/// Cross-line state of one formatting session. Never shared between requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatterState {
    pub last_date: String,
    pub last_time: f64,
}

/// Render one raw log line, updating `state`.
///
/// Output is the optional date separator followed by the line itself, each
/// ending in `\n`. The raw line is expected to be `<`-escaped already.
pub fn format_line(levels: &LevelTable, state: &mut FormatterState, raw: &str) -> String {
    let record = serde_json::from_str::<LogRecord>(raw)
        .unwrap_or_else(|_| LogRecord::fallback(raw, state.last_time));
    state.last_time = record.time;

    let severity = levels.resolve(&record.level);
    let ts = local_time(record.time);

    let mut out = String::new();

    let date = ts.format("%Y-%m-%d").to_string();
    if date != state.last_date {
        let _ = write!(out, "<span class=date>------- {date} -------\n</span>");
        state.last_date = date;
    }

    let _ = write!(
        out,
        "<span class=\"{} l-{}\"><span class=t>{} </span><span class=s><span class={}>{}</span> </span><span class=l>{}</span> {}\n</span>",
        severity.class,
        class_token(&record.name),
        ts.format("%H:%M:%S"),
        severity.glyph_class,
        severity.glyph,
        record.name,
        record.message,
    );

    out
}

/// [`format_line`] bundled with its session state.
#[derive(Debug)]
pub struct LineFormatter<'a> {
    levels: &'a LevelTable,
    state: FormatterState,
}

impl<'a> LineFormatter<'a> {
    pub fn new(levels: &'a LevelTable) -> Self {
        Self {
            levels,
            state: FormatterState::default(),
        }
    }

    pub fn format(&mut self, raw: &str) -> String {
        format_line(self.levels, &mut self.state, raw)
    }

    pub fn state(&self) -> &FormatterState {
        &self.state
    }
}

/// Make a logger name usable as a CSS class token.
pub fn class_token(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Local wall-clock time of a fractional Unix timestamp. Non-finite or
/// out-of-range values render as the epoch.
pub(crate) fn local_time(time: f64) -> DateTime<Local> {
    let secs = time.floor();
    let nanos = ((time - secs) * 1e9) as u32;

    let utc = if secs.is_finite() {
        DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
    } else {
        None
    };

    utc.unwrap_or_default().with_timezone(&Local)
}
