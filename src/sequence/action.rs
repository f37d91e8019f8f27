// src/sequence/action.rs

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

use crate::types::ActionKind;

/// Capture one image with the given exposure.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureAction {
    pub time: DateTime<Utc>,
    pub shutter_seconds: f64,
    pub aperture: f64,
    pub iso: u32,
    pub comment: String,
}

/// Play one sound file.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayAction {
    pub time: DateTime<Utc>,
    pub sound_file: String,
    pub comment: String,
}

/// A fully resolved, absolutely timed device action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Capture(CaptureAction),
    Play(PlayAction),
}

impl Action {
    pub fn time(&self) -> DateTime<Utc> {
        match self {
            Action::Capture(a) => a.time,
            Action::Play(a) => a.time,
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Capture(_) => ActionKind::Capture,
            Action::Play(_) => ActionKind::Play,
        }
    }

    pub fn comment(&self) -> &str {
        match self {
            Action::Capture(a) => &a.comment,
            Action::Play(a) => &a.comment,
        }
    }

    /// Move the action by `delta`. `None` (action untouched) if that leaves
    /// the representable time range.
    pub fn shift(&mut self, delta: TimeDelta) -> Option<()> {
        let time = match self {
            Action::Capture(a) => &mut a.time,
            Action::Play(a) => &mut a.time,
        };
        *time = time.checked_add_signed(delta)?;
        Some(())
    }

    /// Append `note` to the comment.
    pub fn annotate(&mut self, note: &str) {
        match self {
            Action::Capture(a) => a.comment.push_str(note),
            Action::Play(a) => a.comment.push_str(note),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Capture(a) => write!(
                f,
                "{}: take picture SS={} aperture={} ISO={}",
                a.time, a.shutter_seconds, a.aperture, a.iso
            ),
            Action::Play(a) => write!(f, "{}: play sound {}", a.time, a.sound_file),
        }
    }
}
