use std::time::{Duration, Instant};

use super::Clock;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// `FrameClock` is designed to be used per frame loop so that independent hosts
/// do not share delta-time state.
///
/// Delta time is clamped to avoid pathological values when the host is
/// suspended, minimized, or stalls.
#[derive(Debug, Clone)]
pub struct FrameClock<C: Clock> {
    clock: C,
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl<C: Clock> FrameClock<C> {
    /// Default lower clamp; prevents zero-dt frames from tight loops.
    pub const DT_MIN: Duration = Duration::from_micros(100);
    /// Default upper clamp; keeps a long stall from reading as one huge step.
    pub const DT_MAX: Duration = Duration::from_millis(250);

    /// Creates a new clock with default clamps.
    pub fn new(clock: C) -> Self {
        Self::with_clamps(clock, Self::DT_MIN, Self::DT_MAX)
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(clock: C, dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: clock.now(),
            clock,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the delta-time baseline.
    ///
    /// Useful when resuming after the host was suspended.
    pub fn reset(&mut self) {
        self.last = self.clock.now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let now = self.clock.now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}
