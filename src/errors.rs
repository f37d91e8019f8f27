// src/errors.rs

//! Crate-wide error types and aliases.
//!
//! Each stage of the pipeline has its own error enum so callers can match on
//! the failure class; [`SequencerError`] aggregates them for the entry points.

use thiserror::Error;

/// A script line could not be turned into a command tree.
///
/// Compilation stops at the first error; no partial command list is kept.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: {command} expects {expected} fields, found {found}")]
    Arity {
        line: usize,
        command: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid {field} '{value}': {reason}")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("line {line}: loops cannot be nested")]
    NestedLoop { line: usize },

    #[error("line {line}: ENDFOR without an open loop")]
    UnmatchedEndFor { line: usize },
}

/// An event name could not be turned into an absolute instant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("unknown event '{0}'")]
    UnknownEvent(String),

    #[error("invalid magnitude percentage in event '{0}'")]
    InvalidMagnitude(String),

    #[error("magnitude event '{event}' is outside the observed curve and contact {missing} is unknown")]
    MissingContact { event: String, missing: String },

    #[error("event '{0}' plus its offset falls outside the representable time range")]
    OutOfRange(String),
}

/// The event table or its source file is malformed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventTableError {
    #[error("{limb} magnitude curve is not ascending at index {index} ({previous} > {current})")]
    NonMonotonic {
        limb: &'static str,
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("timing file line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },
}

/// A single sequence row could not be read back.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SequenceError {
    #[error("invalid timestamp '{date} {time}'")]
    InvalidTimestamp { date: String, time: String },

    #[error("invalid {field} '{value}'")]
    InvalidField { field: &'static str, value: String },

    #[error("unknown action kind '{0}'")]
    UnknownKind(String),
}

/// Failure reported by a capture device or audio player.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("device initialisation failed: {0}")]
    InitFailed(String),

    #[error("device command failed: {0}")]
    CommandFailed(String),

    #[error("device did not finish within {0:?}")]
    Timeout(std::time::Duration),

    #[error("device IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SequencerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Event resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Event table error: {0}")]
    EventTable(#[from] EventTableError),

    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SequencerError>;
