// src/script/mod.rs

//! Timing script compiler.
//!
//! - [`parser`] turns script text into a command tree.
//! - [`command`] holds the command variants and expands them into actions.
//! - [`fields`] parses offsets, shutter speeds and sound file names.
//!
//! A compiled [`Script`] plus an [`EventTable`] yields a [`Sequence`].

pub mod command;
pub mod fields;
pub mod parser;

use std::fmt;

use tracing::{error, info};

use crate::errors::ResolutionError;
use crate::events::EventTable;
use crate::sequence::{Action, Sequence};

pub use command::{
    CaptureCommand, Command, CountLoop, LeafCommand, PlayCommand, VariableLoop,
};
pub use parser::{compile_script, compile_script_file, ScriptParser};

/// Ordered list of top-level commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    commands: Vec<Command>,
}

impl Script {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Expand every command, in top-level order, without sorting.
    ///
    /// The first event that fails to resolve aborts generation.
    pub fn generate_actions(&self, events: &EventTable) -> Result<Vec<Action>, ResolutionError> {
        let mut actions = Vec::new();
        for (index, command) in self.commands.iter().enumerate() {
            let more = command.generate(events).inspect_err(|err| {
                error!(command = index + 1, error = %err, "timing of event failed");
            })?;
            actions.extend(more);
        }
        Ok(actions)
    }

    /// Expand and sort into a [`Sequence`].
    pub fn generate_sequence(&self, events: &EventTable) -> Result<Sequence, ResolutionError> {
        let actions = self.generate_actions(events)?;
        info!(
            commands = self.commands.len(),
            actions = actions.len(),
            "generated sequence"
        );
        Ok(Sequence::new(actions))
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, command) in self.commands.iter().enumerate() {
            let label = match command {
                Command::Leaf(LeafCommand::Capture(c)) => format!("TAKEPIC {}", c.event),
                Command::Leaf(LeafCommand::Play(c)) => format!("PLAY {}", c.event),
                Command::LoopByVariable(lp) => {
                    format!("FOR (VAR) {} : {} : {}", lp.start, lp.step, lp.end)
                }
                Command::LoopByCount(lp) => format!(
                    "FOR (INTERVALOMETER) {:?} : {} : {}",
                    lp.direction, lp.delay_seconds, lp.iterations
                ),
            };
            writeln!(f, "{}: {label}", index + 1)?;
            for child in command.children() {
                writeln!(f, "    {}", child.event())?;
            }
        }
        Ok(())
    }
}
