// src/engine/mod.rs

//! Realtime replay of a sequence.
//!
//! This module ties together:
//! - the [`clock::VirtualClock`] (real time plus an optional fixed offset)
//! - the [`sequencer::Sequencer`] control loop that sleeps until each action
//!   is due
//! - the [`dispatch::Dispatcher`] hand-off, whose production implementation
//!   routes captures to a single [`device_worker`] and spawns one task per
//!   sound.

pub mod clock;
pub mod device_worker;
pub mod dispatch;
pub mod sequencer;

pub use clock::VirtualClock;
pub use device_worker::{spawn_device_worker, DeviceWorker};
pub use dispatch::{DeviceDispatcher, Dispatcher};
pub use sequencer::Sequencer;

/// Summary of one sequencer run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Actions handed to the dispatcher.
    pub dispatched: usize,
    /// Actions whose time had already passed.
    pub skipped: usize,
    /// True when the run stopped on a shutdown signal.
    pub interrupted: bool,
}
