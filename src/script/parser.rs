// src/script/parser.rs

//! Line-oriented script parser.
//!
//! Each non-blank, non-`#` line is a comma-separated record whose first field
//! names the command:
//!
//! ```text
//! FOR,(VAR),start,step,end
//! FOR,(INTERVALOMETER),direction,delay,count
//! ENDFOR
//! TAKEPIC,event,sign,offset,camera,shutter,aperture,iso,burst,quality,size,incremental,comment
//! PLAY,event,sign,offset,file,-,-,-,-,-,-,-,comment
//! ```
//!
//! Loops hold leaf commands only; at most one loop can be open at a time.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use tracing::{debug, warn};

use crate::errors::{CompileError, Result};
use crate::script::command::{
    CaptureCommand, Command, CountLoop, LeafCommand, PlayCommand, VariableLoop,
};
use crate::script::fields::{normalise_sound_file, parse_offset, parse_shutter};
use crate::script::Script;
use crate::types::LoopDirection;

const FIELD_DELIMITER: char = ',';
const COMMENT_MARKER: char = '#';

/// Number of fields after the command name for leaf commands.
const LEAF_ARITY: usize = 12;
/// Number of fields after `FOR,(kind)` for loops.
const LOOP_ARITY: usize = 3;

/// Upper bound on how many times a single loop may repeat its children.
pub const MAX_LOOP_ITERATIONS: u32 = 100_000;

/// A single parsed line, before it is attached to the command tree.
#[derive(Debug, Clone, PartialEq)]
enum ScriptLine {
    Leaf(LeafCommand),
    OpenLoop(Command),
    LoopEnd,
}

/// The loop currently collecting children.
#[derive(Debug)]
struct OpenLoop {
    line: usize,
    command: Command,
}

/// Builds a [`Script`] from lines of text.
#[derive(Debug, Default)]
pub struct ScriptParser {
    commands: Vec<Command>,
    open_loop: Option<OpenLoop>,
}

impl ScriptParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every line and return the finished script.
    ///
    /// The first malformed line aborts parsing.
    pub fn parse_lines<I, S>(mut self, lines: I) -> std::result::Result<Script, CompileError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (index, line) in lines.into_iter().enumerate() {
            self.parse_line(index + 1, line.as_ref())?;
        }
        Ok(self.finish())
    }

    fn parse_line(&mut self, line_no: usize, raw: &str) -> std::result::Result<(), CompileError> {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            return Ok(());
        }

        let parsed = make_line(line_no, line)?;
        self.attach(line_no, parsed)
    }

    fn attach(&mut self, line_no: usize, parsed: ScriptLine) -> std::result::Result<(), CompileError> {
        match parsed {
            ScriptLine::OpenLoop(_) if self.open_loop.is_some() => {
                Err(CompileError::NestedLoop { line: line_no })
            }
            ScriptLine::OpenLoop(command) => {
                debug!(line = line_no, "opening loop");
                self.open_loop = Some(OpenLoop {
                    line: line_no,
                    command,
                });
                Ok(())
            }
            ScriptLine::LoopEnd if self.open_loop.is_none() => {
                Err(CompileError::UnmatchedEndFor { line: line_no })
            }
            ScriptLine::LoopEnd => {
                self.close_loop();
                Ok(())
            }
            ScriptLine::Leaf(leaf) => {
                match self.open_loop.as_mut() {
                    Some(open) => push_child(&mut open.command, leaf),
                    None => self.commands.push(Command::Leaf(leaf)),
                }
                Ok(())
            }
        }
    }

    fn close_loop(&mut self) {
        if let Some(open) = self.open_loop.take() {
            debug!(
                line = open.line,
                children = open.command.children().len(),
                "closing loop"
            );
            self.commands.push(open.command);
        }
    }

    fn finish(mut self) -> Script {
        if let Some(open) = &self.open_loop {
            warn!(line = open.line, "loop not closed by ENDFOR; closing at end of script");
        }
        self.close_loop();
        Script::new(self.commands)
    }
}

/// Compile script text into a [`Script`].
pub fn compile_script(text: &str) -> std::result::Result<Script, CompileError> {
    ScriptParser::new().parse_lines(text.lines())
}

/// Read and compile a script file.
pub fn compile_script_file(path: impl AsRef<Path>) -> Result<Script> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("reading script {:?}", path))?;
    Ok(compile_script(&text)?)
}

fn push_child(command: &mut Command, leaf: LeafCommand) {
    match command {
        Command::LoopByVariable(lp) => lp.children.push(leaf),
        Command::LoopByCount(lp) => lp.children.push(leaf),
        // Only loops are ever stored as the open loop.
        Command::Leaf(_) => {}
    }
}

fn make_line(line_no: usize, line: &str) -> std::result::Result<ScriptLine, CompileError> {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();

    match fields.as_slice() {
        ["FOR", "(VAR)", rest @ ..] => variable_loop(line_no, rest),
        ["FOR", "(INTERVALOMETER)", rest @ ..] => count_loop(line_no, rest),
        ["FOR", kind, ..] => Err(CompileError::UnknownCommand {
            line: line_no,
            command: format!("FOR {kind}"),
        }),
        ["ENDFOR", ..] => Ok(ScriptLine::LoopEnd),
        ["TAKEPIC", rest @ ..] => capture(line_no, rest),
        ["PLAY", rest @ ..] => play(line_no, rest),
        [unknown, ..] => Err(CompileError::UnknownCommand {
            line: line_no,
            command: unknown.to_string(),
        }),
        [] => Err(CompileError::UnknownCommand {
            line: line_no,
            command: String::new(),
        }),
    }
}

fn expect_arity(
    line: usize,
    command: &'static str,
    fields: &[&str],
    expected: usize,
) -> std::result::Result<(), CompileError> {
    if fields.len() != expected {
        return Err(CompileError::Arity {
            line,
            command,
            expected,
            found: fields.len(),
        });
    }
    Ok(())
}

fn number<T: FromStr>(
    line: usize,
    field: &'static str,
    value: &str,
) -> std::result::Result<T, CompileError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| CompileError::InvalidField {
        line,
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn finite(line: usize, field: &'static str, value: &str) -> std::result::Result<f64, CompileError> {
    let parsed: f64 = number(line, field, value)?;
    if !parsed.is_finite() {
        return Err(invalid(line, field, value, "must be finite"));
    }
    Ok(parsed)
}

fn invalid(line: usize, field: &'static str, value: &str, reason: &str) -> CompileError {
    CompileError::InvalidField {
        line,
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn variable_loop(line: usize, fields: &[&str]) -> std::result::Result<ScriptLine, CompileError> {
    expect_arity(line, "FOR (VAR)", fields, LOOP_ARITY)?;
    let start = finite(line, "start", fields[0])?;
    let step = finite(line, "step", fields[1])?;
    let end = finite(line, "end", fields[2])?;
    if step <= 0.0 {
        return Err(invalid(line, "step", fields[1], "must be positive"));
    }
    // At this magnitude the step can vanish in rounding and the loop would
    // never reach its end.
    if start + step <= start || end + step <= end {
        return Err(invalid(line, "step", fields[1], "too small to advance the loop value"));
    }
    let iterations = ((end - start) / step).ceil();
    if iterations > MAX_LOOP_ITERATIONS as f64 {
        return Err(invalid(
            line,
            "step",
            fields[1],
            &format!("loop would run more than {MAX_LOOP_ITERATIONS} times"),
        ));
    }

    Ok(ScriptLine::OpenLoop(Command::LoopByVariable(VariableLoop {
        start,
        step,
        end,
        children: Vec::new(),
    })))
}

fn count_loop(line: usize, fields: &[&str]) -> std::result::Result<ScriptLine, CompileError> {
    expect_arity(line, "FOR (INTERVALOMETER)", fields, LOOP_ARITY)?;
    let direction = LoopDirection::from_code(number(line, "direction", fields[0])?);
    let delay_seconds = finite(line, "delay", fields[1])?;
    let iterations = number(line, "iterations", fields[2])?;
    if iterations > MAX_LOOP_ITERATIONS {
        return Err(invalid(
            line,
            "iterations",
            fields[2],
            &format!("at most {MAX_LOOP_ITERATIONS} allowed"),
        ));
    }

    Ok(ScriptLine::OpenLoop(Command::LoopByCount(CountLoop {
        direction,
        delay_seconds,
        iterations,
        children: Vec::new(),
    })))
}

fn capture(line: usize, fields: &[&str]) -> std::result::Result<ScriptLine, CompileError> {
    expect_arity(line, "TAKEPIC", fields, LEAF_ARITY)?;
    // event, sign, offset, camera, shutter, aperture, iso, burst, quality,
    // size, incremental, comment
    let offset = parse_offset(fields[1], fields[2])
        .ok_or_else(|| invalid(line, "offset", fields[2], "expected [HH:]MM:SS"))?;
    let shutter_seconds = parse_shutter(fields[4])
        .ok_or_else(|| invalid(line, "shutter", fields[4], "expected seconds or N/D"))?;
    let aperture = finite(line, "aperture", fields[5])?;
    let iso = number(line, "iso", fields[6])?;

    Ok(ScriptLine::Leaf(LeafCommand::Capture(CaptureCommand {
        event: fields[0].trim().to_string(),
        offset,
        shutter_seconds,
        aperture,
        iso,
        comment: fields[11].to_string(),
    })))
}

fn play(line: usize, fields: &[&str]) -> std::result::Result<ScriptLine, CompileError> {
    expect_arity(line, "PLAY", fields, LEAF_ARITY)?;
    // event, sign, offset, file, 7 unused, comment
    let offset = parse_offset(fields[1], fields[2])
        .ok_or_else(|| invalid(line, "offset", fields[2], "expected [HH:]MM:SS"))?;

    Ok(ScriptLine::Leaf(LeafCommand::Play(PlayCommand {
        event: fields[0].trim().to_string(),
        offset,
        sound_file: normalise_sound_file(fields[3]),
        comment: fields[11].to_string(),
    })))
}
