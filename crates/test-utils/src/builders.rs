#![allow(dead_code)]

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use eclipse_sequencer::errors::EventTableError;
use eclipse_sequencer::events::{EventTable, MagnitudeReading};
use eclipse_sequencer::sequence::timefmt::parse_date_time_str;
use eclipse_sequencer::sequence::{Action, CaptureAction, PlayAction};

/// Parse `"YYYY/MM/DD HH:MM:SS.s"` as UTC. Panics on bad input.
pub fn utc(text: &str) -> DateTime<Utc> {
    parse_date_time_str(text).unwrap_or_else(|| panic!("bad test timestamp '{text}'"))
}

/// Builder for `EventTable` to simplify test setup.
///
/// Post-limb readings are given chronologically, as in a timing file.
pub struct EventTableBuilder {
    instants: HashMap<String, DateTime<Utc>>,
    pre: Vec<MagnitudeReading>,
    post: Vec<MagnitudeReading>,
    max_magnitude: Option<f64>,
}

impl EventTableBuilder {
    pub fn new() -> Self {
        Self {
            instants: HashMap::new(),
            pre: Vec::new(),
            post: Vec::new(),
            max_magnitude: None,
        }
    }

    /// C1..C4 and MAX spread over one afternoon:
    /// C1 17:00, C2 18:00, MAX 18:02, C3 18:04, C4 19:00 on 2024/04/08.
    pub fn contacts() -> Self {
        Self::new()
            .with_instant("C1", utc("2024/04/08 17:00:00.0"))
            .with_instant("C2", utc("2024/04/08 18:00:00.0"))
            .with_instant("MAX", utc("2024/04/08 18:02:00.0"))
            .with_instant("C3", utc("2024/04/08 18:04:00.0"))
            .with_instant("C4", utc("2024/04/08 19:00:00.0"))
    }

    pub fn with_instant(mut self, name: &str, time: DateTime<Utc>) -> Self {
        self.instants.insert(name.to_string(), time);
        self
    }

    pub fn without_instant(mut self, name: &str) -> Self {
        self.instants.remove(name);
        self
    }

    pub fn pre(mut self, magnitude: f64, time: DateTime<Utc>) -> Self {
        self.pre.push(MagnitudeReading::new(magnitude, time));
        self
    }

    pub fn post(mut self, magnitude: f64, time: DateTime<Utc>) -> Self {
        self.post.push(MagnitudeReading::new(magnitude, time));
        self
    }

    pub fn max_magnitude(mut self, magnitude: f64) -> Self {
        self.max_magnitude = Some(magnitude);
        self
    }

    pub fn try_build(self) -> Result<EventTable, EventTableError> {
        EventTable::new(self.instants, self.pre, self.post, self.max_magnitude)
    }

    pub fn build(self) -> EventTable {
        self.try_build().expect("Failed to build valid event table from builder")
    }
}

impl Default for EventTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A 12-field `TAKEPIC` script line.
pub fn takepic_line(event: &str, sign: &str, offset: &str, shutter: &str, comment: &str) -> String {
    format!("TAKEPIC,{event},{sign},{offset},EOS,{shutter},8.0,100,1,RAW,L,N,{comment}")
}

/// A 12-field `PLAY` script line.
pub fn play_line(event: &str, sign: &str, offset: &str, file: &str, comment: &str) -> String {
    format!("PLAY,{event},{sign},{offset},{file},,,,,,,,{comment}")
}

/// A capture with fixed exposure at `time`.
pub fn capture_at(time: DateTime<Utc>, comment: &str) -> Action {
    Action::Capture(CaptureAction {
        time,
        shutter_seconds: 0.001,
        aperture: 8.0,
        iso: 100,
        comment: comment.to_string(),
    })
}

/// A sound action at `time`.
pub fn play_at(time: DateTime<Utc>, file: &str, comment: &str) -> Action {
    Action::Play(PlayAction {
        time,
        sound_file: file.to_string(),
        comment: comment.to_string(),
    })
}

/// `base + seconds`, at millisecond resolution.
pub fn plus_secs(base: DateTime<Utc>, seconds: f64) -> DateTime<Utc> {
    base + TimeDelta::milliseconds((seconds * 1000.0).round() as i64)
}
