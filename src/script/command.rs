// src/script/command.rs

//! Command tree produced by the script parser, and action generation.

use chrono::TimeDelta;

use crate::errors::ResolutionError;
use crate::events::EventTable;
use crate::sequence::{Action, CaptureAction, PlayAction};
use crate::types::LoopDirection;

/// `TAKEPIC`: capture one image relative to an event.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureCommand {
    pub event: String,
    pub offset: TimeDelta,
    pub shutter_seconds: f64,
    pub aperture: f64,
    pub iso: u32,
    pub comment: String,
}

/// `PLAY`: play one sound file relative to an event.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayCommand {
    pub event: String,
    pub offset: TimeDelta,
    pub sound_file: String,
    pub comment: String,
}

/// A command that produces exactly one action. Only leaves may appear inside
/// a loop.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafCommand {
    Capture(CaptureCommand),
    Play(PlayCommand),
}

/// `FOR,(VAR),start,step,end`: re-run the children with the loop value
/// substituted into their event name.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableLoop {
    pub start: f64,
    pub step: f64,
    pub end: f64,
    pub children: Vec<LeafCommand>,
}

/// `FOR,(INTERVALOMETER),direction,delay,count`: repeat the children at a
/// fixed cadence.
#[derive(Debug, Clone, PartialEq)]
pub struct CountLoop {
    pub direction: LoopDirection,
    pub delay_seconds: f64,
    pub iterations: u32,
    pub children: Vec<LeafCommand>,
}

/// Top-level script command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Leaf(LeafCommand),
    LoopByVariable(VariableLoop),
    LoopByCount(CountLoop),
}

impl LeafCommand {
    pub fn event(&self) -> &str {
        match self {
            LeafCommand::Capture(c) => &c.event,
            LeafCommand::Play(c) => &c.event,
        }
    }

    /// Resolve the (possibly overridden) event and build the action.
    pub fn generate(
        &self,
        events: &EventTable,
        override_event: Option<&str>,
    ) -> Result<Action, ResolutionError> {
        let event = override_event.unwrap_or(self.event());
        let at = |offset: TimeDelta| {
            events
                .resolve(event)?
                .checked_add_signed(offset)
                .ok_or_else(|| ResolutionError::OutOfRange(event.to_string()))
        };

        let action = match self {
            LeafCommand::Capture(c) => Action::Capture(CaptureAction {
                time: at(c.offset)?,
                shutter_seconds: c.shutter_seconds,
                aperture: c.aperture,
                iso: c.iso,
                comment: c.comment.clone(),
            }),
            LeafCommand::Play(c) => Action::Play(PlayAction {
                time: at(c.offset)?,
                sound_file: c.sound_file.clone(),
                comment: c.comment.clone(),
            }),
        };
        Ok(action)
    }
}

impl VariableLoop {
    pub fn generate(&self, events: &EventTable) -> Result<Vec<Action>, ResolutionError> {
        let mut actions = Vec::new();
        let mut value = self.start;

        while value < self.end {
            let var = format!("{value:04.1}");
            for child in &self.children {
                let kind = child.event().split_whitespace().next().unwrap_or_default();
                let event = format!("{kind} {var}");

                let mut action = child.generate(events, Some(&event))?;
                if matches!(kind, "MAGPRE" | "MAGPOST") {
                    action.annotate(&format!(" (Mag. {var}%)"));
                }
                actions.push(action);
            }
            value += self.step;
        }

        Ok(actions)
    }
}

impl CountLoop {
    pub fn generate(&self, events: &EventTable) -> Result<Vec<Action>, ResolutionError> {
        let mut actions = Vec::new();
        let mut offset_seconds = 0.0_f64;

        for iteration in 1..=self.iterations {
            for child in &self.children {
                let out_of_range = || ResolutionError::OutOfRange(child.event().to_string());
                let shift = whole_centiseconds(offset_seconds).ok_or_else(out_of_range)?;
                let mut action = child.generate(events, None)?;
                action.shift(shift).ok_or_else(out_of_range)?;
                action.annotate(&format!(" (iter. {iteration:03})"));
                actions.push(action);
            }
            offset_seconds += self.direction.sign() * self.delay_seconds;
        }

        Ok(actions)
    }
}

impl Command {
    /// Actions for this command, in generation order (not yet time-sorted).
    pub fn generate(&self, events: &EventTable) -> Result<Vec<Action>, ResolutionError> {
        match self {
            Command::Leaf(leaf) => Ok(vec![leaf.generate(events, None)?]),
            Command::LoopByVariable(lp) => lp.generate(events),
            Command::LoopByCount(lp) => lp.generate(events),
        }
    }

    pub fn children(&self) -> &[LeafCommand] {
        match self {
            Command::Leaf(_) => &[],
            Command::LoopByVariable(lp) => &lp.children,
            Command::LoopByCount(lp) => &lp.children,
        }
    }
}

/// Loop offsets are applied in whole centiseconds, truncated toward zero.
fn whole_centiseconds(seconds: f64) -> Option<TimeDelta> {
    let centis = (seconds * 100.0).trunc() as i64;
    centis.checked_mul(10_000).map(TimeDelta::microseconds)
}
