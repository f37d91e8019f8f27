// src/events/table.rs

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::errors::{EventTableError, ResolutionError};

/// One (magnitude, instant) observation on a limb of the magnitude curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnitudeReading {
    pub magnitude: f64,
    pub time: DateTime<Utc>,
}

impl MagnitudeReading {
    pub fn new(magnitude: f64, time: DateTime<Utc>) -> Self {
        Self { magnitude, time }
    }
}

/// Which side of maximum a magnitude event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limb {
    Pre,
    Post,
}

impl Limb {
    pub fn name(self) -> &'static str {
        match self {
            Limb::Pre => "pre",
            Limb::Post => "post",
        }
    }
}

impl fmt::Display for Limb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named instants plus the two limbs of the magnitude curve.
///
/// Both stored curves are ascending in magnitude. The post limb is supplied
/// in chronological order (magnitude falling) and reversed on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct EventTable {
    instants: HashMap<String, DateTime<Utc>>,
    pre_magnitudes: Vec<MagnitudeReading>,
    post_magnitudes: Vec<MagnitudeReading>,
    max_magnitude: f64,
}

impl EventTable {
    /// Build a table, rejecting magnitude curves that are not monotonic.
    ///
    /// - `pre`: readings up to maximum, chronological (magnitude rising).
    /// - `post_chronological`: readings after maximum, chronological
    ///   (magnitude falling).
    /// - `max_magnitude`: peak covered fraction, `1.0` when unknown.
    pub fn new(
        instants: HashMap<String, DateTime<Utc>>,
        pre: Vec<MagnitudeReading>,
        post_chronological: Vec<MagnitudeReading>,
        max_magnitude: Option<f64>,
    ) -> Result<Self, EventTableError> {
        let mut post = post_chronological;
        post.reverse();

        ensure_ascending(Limb::Pre, &pre)?;
        ensure_ascending(Limb::Post, &post)?;

        Ok(Self {
            instants,
            pre_magnitudes: pre,
            post_magnitudes: post,
            max_magnitude: max_magnitude.unwrap_or(1.0),
        })
    }

    /// A table holding named instants only.
    pub fn from_instants(instants: HashMap<String, DateTime<Utc>>) -> Self {
        Self {
            instants,
            pre_magnitudes: Vec::new(),
            post_magnitudes: Vec::new(),
            max_magnitude: 1.0,
        }
    }

    pub fn instant(&self, name: &str) -> Option<DateTime<Utc>> {
        self.instants.get(name).copied()
    }

    pub fn instants(&self) -> &HashMap<String, DateTime<Utc>> {
        &self.instants
    }

    pub fn max_magnitude(&self) -> f64 {
        self.max_magnitude
    }

    /// Ascending curve for the given limb.
    pub fn magnitudes(&self, limb: Limb) -> &[MagnitudeReading] {
        match limb {
            Limb::Pre => &self.pre_magnitudes,
            Limb::Post => &self.post_magnitudes,
        }
    }

    /// Resolve an event name to an absolute instant.
    ///
    /// Accepted names:
    /// - any key of the instant map (`C1`..`C4`, `MAX`, ...)
    /// - `MAGPRE <percent>` / `MAGPOST <percent>`
    pub fn resolve(&self, name: &str) -> Result<DateTime<Utc>, ResolutionError> {
        if let Some(time) = self.instant(name) {
            return Ok(time);
        }

        let parts: Vec<&str> = name.split_whitespace().collect();
        match parts.as_slice() {
            ["MAGPRE", percent] => self.resolve_magnitude(name, percent, Limb::Pre),
            ["MAGPOST", percent] => self.resolve_magnitude(name, percent, Limb::Post),
            _ => Err(ResolutionError::UnknownEvent(name.to_string())),
        }
    }

    fn resolve_magnitude(
        &self,
        name: &str,
        percent: &str,
        limb: Limb,
    ) -> Result<DateTime<Utc>, ResolutionError> {
        let fraction = percent
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .map(|p| p / 100.0)
            .ok_or_else(|| ResolutionError::InvalidMagnitude(name.to_string()))?;

        if let Some(time) = interpolate_time(self.magnitudes(limb), fraction) {
            return Ok(time);
        }

        debug!(event = name, %limb, fraction, "magnitude outside curve; using contact fallback");

        match limb {
            Limb::Pre => {
                // Linear between C1 and C2, scaled to the peak magnitude.
                let c1 = self.contact(name, "C1")?;
                let c2 = self.contact(name, "C2")?;
                c1.checked_add_signed(scale_delta(c2 - c1, fraction * self.max_magnitude))
                    .ok_or_else(|| ResolutionError::OutOfRange(name.to_string()))
            }
            Limb::Post => {
                // Linear between C3 and C4, measured back from C4.
                let c3 = self.contact(name, "C3")?;
                let c4 = self.contact(name, "C4")?;
                c4.checked_sub_signed(scale_delta(c4 - c3, fraction))
                    .ok_or_else(|| ResolutionError::OutOfRange(name.to_string()))
            }
        }
    }

    fn contact(&self, event: &str, contact: &str) -> Result<DateTime<Utc>, ResolutionError> {
        self.instant(contact)
            .ok_or_else(|| ResolutionError::MissingContact {
                event: event.to_string(),
                missing: contact.to_string(),
            })
    }
}

fn ensure_ascending(limb: Limb, curve: &[MagnitudeReading]) -> Result<(), EventTableError> {
    for (index, pair) in curve.windows(2).enumerate() {
        let (previous, current) = (pair[0].magnitude, pair[1].magnitude);
        if previous.is_nan() || current.is_nan() || current < previous {
            return Err(EventTableError::NonMonotonic {
                limb: limb.name(),
                index: index + 1,
                previous,
                current,
            });
        }
    }
    Ok(())
}

/// Locate the readings bracketing `target` on an ascending curve.
///
/// Returns `(lo, hi)` where `lo` is the last index of the leading run with
/// magnitude `<= target` and `hi` is the first index of the trailing run with
/// magnitude `>= target`. `None` when `target` lies outside the curve.
pub fn find_bounds(curve: &[MagnitudeReading], target: f64) -> Option<(usize, usize)> {
    let lo = curve
        .iter()
        .take_while(|r| r.magnitude <= target)
        .count()
        .checked_sub(1)?;

    let trailing = curve
        .iter()
        .rev()
        .take_while(|r| r.magnitude >= target)
        .count();
    let hi = curve.len().checked_sub(trailing).filter(|_| trailing > 0)?;

    Some((lo, hi))
}

/// Interpolate the instant at which the curve reaches `target`.
pub fn interpolate_time(curve: &[MagnitudeReading], target: f64) -> Option<DateTime<Utc>> {
    let (lo, hi) = find_bounds(curve, target)?;
    if lo == hi {
        return Some(curve[lo].time);
    }

    let (low, high) = (curve[lo], curve[hi]);
    let delta_m = high.magnitude - low.magnitude;
    if delta_m == 0.0 {
        // Flat stretch at exactly `target`.
        return Some(curve[lo.min(hi)].time);
    }

    let fraction = (target - low.magnitude) / delta_m;
    Some(low.time + scale_delta(high.time - low.time, fraction))
}

/// Scale a duration by a float factor at microsecond resolution.
pub(crate) fn scale_delta(delta: TimeDelta, factor: f64) -> TimeDelta {
    let micros = delta
        .num_microseconds()
        .unwrap_or_else(|| delta.num_milliseconds().saturating_mul(1_000));
    TimeDelta::microseconds((micros as f64 * factor).round() as i64)
}
