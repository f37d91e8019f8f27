// src/events/timing_file.rs

//! Parser for eclipse contact-timing text exports.
//!
//! Recognised lines (anything else is ignored):
//!
//! ```text
//! 1st Contact  2024/04/08  17:02:11.6 ...
//! C2           2024/04/08  18:18:29.3 ...
//! Max Eclipse  2024/04/08  18:20:18.0 ...
//! Magnitude at maximum : 1.0136
//! 17:05:00.0   ...   ...   0.0213 ...
//! ```
//!
//! Magnitude readings carry a time of day only; they are dated with the date
//! of the first `Nth Contact` line. Readings belong to the pre-maximum limb
//! until the first drop in magnitude, after which they belong to the
//! post-maximum limb.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use regex::{Captures, Regex};
use tracing::{debug, error, info};

use crate::errors::{EventTableError, Result};
use crate::events::table::{EventTable, MagnitudeReading};
use crate::sequence::timefmt::{parse_date_time, parse_time_of_day};

const DATE: &str = r"(\d{4}/\d{2}/\d{2})";
const TIME: &str = r"(\d{2}:\d{2}:\d{2}\.\d)";
const DECIMAL: &str = r"([0-9.]+)";

/// Compiled line patterns for timing files.
#[derive(Debug, Clone)]
pub struct TimingFileParser {
    contact_long: Regex,
    contact_short: Regex,
    max_eclipse: Regex,
    max_magnitude: Regex,
    magnitude: Regex,
}

/// Mutable state while scanning a file.
#[derive(Debug, Default)]
struct ScanState {
    instants: HashMap<String, DateTime<Utc>>,
    pre: Vec<MagnitudeReading>,
    post: Vec<MagnitudeReading>,
    in_post: bool,
    previous_magnitude: Option<f64>,
    max_magnitude: Option<f64>,
    default_date: Option<NaiveDate>,
}

impl TimingFileParser {
    pub fn new() -> Result<Self> {
        let compile = |pattern: String| {
            Regex::new(&pattern).with_context(|| format!("compiling timing pattern {pattern:?}"))
        };

        Ok(Self {
            contact_long: compile(format!(r"^(.).. Contact\s+{DATE}\s+{TIME}"))?,
            contact_short: compile(format!(r"^C(\d)\s+{DATE}\s+{TIME}"))?,
            max_eclipse: compile(format!(r"^Max Eclipse\s+{DATE}\s+{TIME}"))?,
            max_magnitude: compile(format!(r"^Magnitude at maximum .* {DECIMAL}"))?,
            magnitude: compile(format!(r"^{TIME}\s+{DECIMAL}\s+{DECIMAL}\s+{DECIMAL}"))?,
        })
    }

    /// Parse timing text into an [`EventTable`].
    pub fn parse_str(&self, text: &str) -> Result<EventTable> {
        let mut state = ScanState::default();

        for (index, line) in text.lines().enumerate() {
            self.scan_line(&mut state, index + 1, line)?;
        }

        match state.max_magnitude {
            Some(mag) => info!(max_magnitude = mag, "found peak magnitude"),
            None => error!("did not find max. magnitude in contact file; assuming 1.0"),
        }
        info!(
            contacts = state.instants.len(),
            pre = state.pre.len(),
            post = state.post.len(),
            "parsed timing file"
        );

        let table = EventTable::new(state.instants, state.pre, state.post, state.max_magnitude)?;
        Ok(table)
    }

    fn scan_line(&self, state: &mut ScanState, line_no: usize, line: &str) -> Result<()> {
        if let Some(caps) = self.contact_long.captures(line) {
            let time = timestamp(&caps, 2, line_no)?;
            state.default_date.get_or_insert(time.date_naive());
            state.instants.insert(format!("C{}", &caps[1]), time);
        } else if let Some(caps) = self.contact_short.captures(line) {
            let time = timestamp(&caps, 2, line_no)?;
            state.instants.insert(format!("C{}", &caps[1]), time);
        } else if let Some(caps) = self.max_eclipse.captures(line) {
            let time = timestamp(&caps, 1, line_no)?;
            state.instants.insert("MAX".to_string(), time);
        } else if let Some(caps) = self.max_magnitude.captures(line) {
            state.max_magnitude = Some(decimal(&caps[1], line_no)?);
        } else if let Some(caps) = self.magnitude.captures(line) {
            let Some(date) = state.default_date else {
                return Err(invalid(line_no, "magnitude reading before any contact line").into());
            };
            let time = parse_time_of_day(&caps[1])
                .ok_or_else(|| invalid(line_no, "invalid time of day"))?;
            let magnitude = decimal(&caps[4], line_no)?;
            let reading = MagnitudeReading::new(magnitude, date.and_time(time).and_utc());

            if !state.in_post && state.previous_magnitude.is_some_and(|prev| magnitude < prev) {
                debug!(line = line_no, magnitude, "magnitude falling; switching to post limb");
                state.in_post = true;
            }

            if state.in_post {
                state.post.push(reading);
            } else {
                state.previous_magnitude = Some(magnitude);
                state.pre.push(reading);
            }
        }
        Ok(())
    }
}

/// Parse a timing file from disk.
///
/// Invalid UTF-8 is replaced rather than rejected; exports from some
/// prediction tools carry stray Latin-1 degree signs.
pub fn parse_timing_file(path: impl AsRef<Path>) -> Result<EventTable> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("reading timing file {:?}", path))?;
    let text = String::from_utf8_lossy(&bytes);
    TimingFileParser::new()?.parse_str(&text)
}

/// Parse timing text held in memory.
pub fn parse_timing_str(text: &str) -> Result<EventTable> {
    TimingFileParser::new()?.parse_str(text)
}

fn timestamp(caps: &Captures<'_>, first: usize, line_no: usize) -> Result<DateTime<Utc>> {
    let time = parse_date_time(&caps[first], &caps[first + 1])
        .ok_or_else(|| invalid(line_no, "invalid date or time"))?;
    Ok(time)
}

fn decimal(text: &str, line_no: usize) -> Result<f64> {
    let value = text
        .parse::<f64>()
        .map_err(|_| invalid(line_no, &format!("invalid number '{text}'")))?;
    Ok(value)
}

fn invalid(line: usize, reason: &str) -> EventTableError {
    EventTableError::InvalidLine {
        line,
        reason: reason.to_string(),
    }
}
