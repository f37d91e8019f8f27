// src/events/mod.rs

//! Astronomical event instants.
//!
//! - [`table`] holds the [`EventTable`] and answers "when does event X
//!   happen", interpolating along the magnitude curve for `MAGPRE`/`MAGPOST`.
//! - [`timing_file`] builds an `EventTable` from a contact-timing export.
//!
//! Contact times themselves are computed elsewhere; this module only consumes
//! them.

pub mod table;
pub mod timing_file;

pub use table::{find_bounds, interpolate_time, EventTable, Limb, MagnitudeReading};
pub use timing_file::{parse_timing_file, parse_timing_str, TimingFileParser};
