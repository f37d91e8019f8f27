// src/engine/clock.rs

use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::Instant;

/// Wall clock with a fixed offset.
///
/// The clock is anchored once: a UTC instant paired with a monotonic
/// [`Instant`]. `now()` advances the UTC anchor by the monotonic time elapsed
/// since then, so it never jumps with system clock adjustments and follows
/// tokio's paused clock in tests.
#[derive(Debug, Clone, Copy)]
pub struct VirtualClock {
    anchor_wall: DateTime<Utc>,
    anchor: Instant,
    offset: TimeDelta,
}

impl VirtualClock {
    /// Real time, no offset.
    pub fn system() -> Self {
        Self {
            anchor_wall: Utc::now(),
            anchor: Instant::now(),
            offset: TimeDelta::zero(),
        }
    }

    /// A clock that reads `virtual_now` right now and advances in real time
    /// from there.
    pub fn starting_at(virtual_now: DateTime<Utc>) -> Self {
        let real_now = Utc::now();
        Self {
            anchor_wall: virtual_now,
            anchor: Instant::now(),
            offset: virtual_now - real_now,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        let elapsed = TimeDelta::from_std(self.anchor.elapsed()).unwrap_or(TimeDelta::MAX);
        self.anchor_wall
            .checked_add_signed(elapsed)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// `virtual_now - real_now` at construction time.
    pub fn offset(&self) -> TimeDelta {
        self.offset
    }

    pub fn is_virtual(&self) -> bool {
        !self.offset.is_zero()
    }
}
