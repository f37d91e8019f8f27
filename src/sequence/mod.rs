// src/sequence/mod.rs

//! Time-ordered action lists and their on-disk representation.
//!
//! - [`action`] defines the compiled [`Action`] variants.
//! - [`csv_file`] reads and writes the tabular sequence file.
//! - [`timefmt`] holds the date/time text formats used across the crate.

pub mod action;
pub mod csv_file;
pub mod timefmt;

pub use action::{Action, CaptureAction, PlayAction};
pub use csv_file::FIELD_NAMES;

use crate::types::ActionKind;

/// Canonical list of actions, sorted by time.
///
/// Sorting is stable: actions sharing a timestamp keep the order in which
/// they were generated (or read).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    actions: Vec<Action>,
}

impl Sequence {
    pub fn new(mut actions: Vec<Action>) -> Self {
        actions.sort_by_key(Action::time);
        Self { actions }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn into_actions(self) -> Vec<Action> {
        self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Actions whose kind is not in `disabled`, still in time order.
    pub fn filtered(&self, disabled: &[ActionKind]) -> Vec<Action> {
        self.actions
            .iter()
            .filter(|a| !disabled.contains(&a.kind()))
            .cloned()
            .collect()
    }
}
