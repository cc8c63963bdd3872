// Fixed-step simulation clock.
//
// The clock owns the tick counter and the contract for when ticks happen.
// It never calls into the simulation itself: `Game` asks it how many ticks
// are due (`advance`) and then runs them, firing the before-tick phase
// (command replay) and the tick phase (simulation step + victory check) for
// each. This keeps the whole tick sequence single-threaded and synchronous.
//
// A tick nominally lasts `tick_ms` milliseconds (60 by default). The speed
// factor rescales that interval for fast-forward or slow motion; changing it
// restarts the step accumulator so no partial step carries over at the old
// rate. `suspend()` freezes progress without losing `tick_index`; `stop()` is
// terminal.
//
// See also: `game.rs` for the tick driver, `config.rs` for `tick_ms`.
//
// **Critical constraint: determinism.** Wall-clock time only decides *how
// many* ticks run, never what happens inside one. `tick_index` is monotonic
// and only `tick()` changes it.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Speed factors are clamped to this range.
pub const MIN_SPEED_FACTOR: f32 = 0.1;
pub const MAX_SPEED_FACTOR: f32 = 64.0;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Clock {
    tick_index: u64,
    ticks_time_limit: u64,
    tick_ms: u64,
    speed_factor: f32,
    running: bool,
    stopped: bool,
    /// Wall time accumulated toward the next step.
    #[serde(skip)]
    pending: Duration,
}

impl Clock {
    pub fn new(time_limit_secs: u32, tick_ms: u64) -> Self {
        let tick_ms = tick_ms.max(1);
        Self {
            tick_index: 0,
            ticks_time_limit: seconds_to_ticks(time_limit_secs, tick_ms),
            tick_ms,
            speed_factor: 1.0,
            running: false,
            stopped: false,
            pending: Duration::ZERO,
        }
    }

    pub fn tick_index(&self) -> u64 {
        self.tick_index
    }

    pub fn ticks_time_limit(&self) -> u64 {
        self.ticks_time_limit
    }

    /// Ticks remaining before time runs out.
    pub fn left_ticks(&self) -> u64 {
        self.ticks_time_limit.saturating_sub(self.tick_index)
    }

    /// Whole seconds remaining, rounded down.
    pub fn left_seconds(&self) -> u64 {
        self.left_ticks() * self.tick_ms / 1000
    }

    /// Advance the counter by one. Returns the new tick index. No-op once
    /// stopped.
    pub fn tick(&mut self) -> u64 {
        if !self.stopped {
            self.tick_index += 1;
        }
        self.tick_index
    }

    pub fn resume(&mut self) {
        if !self.stopped {
            self.running = true;
        }
    }

    pub fn suspend(&mut self) {
        self.running = false;
        self.pending = Duration::ZERO;
    }

    pub fn toggle(&mut self) {
        if self.running {
            self.suspend();
        } else {
            self.resume();
        }
    }

    /// Terminal: the clock never runs again.
    pub fn stop(&mut self) {
        self.running = false;
        self.stopped = true;
        self.pending = Duration::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn speed_factor(&self) -> f32 {
        self.speed_factor
    }

    /// Rescale the step interval. Non-positive factors are ignored, others
    /// are clamped to `MIN_SPEED_FACTOR..=MAX_SPEED_FACTOR`.
    pub fn set_speed_factor(&mut self, factor: f32) {
        if factor <= 0.0 || !factor.is_finite() {
            return;
        }
        self.speed_factor = factor.clamp(MIN_SPEED_FACTOR, MAX_SPEED_FACTOR);
        self.pending = Duration::ZERO;
    }

    /// Wall time between two ticks at the current speed.
    pub fn step_interval(&self) -> Duration {
        let nanos = self.tick_ms as f64 * 1_000_000.0 / f64::from(self.speed_factor);
        Duration::from_nanos(nanos.round() as u64)
    }

    /// Account for `elapsed` wall time and return how many ticks are due.
    /// Returns 0 while suspended or stopped. The count saturates at
    /// `u32::MAX`; only the sub-step remainder carries over.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if !self.running {
            return 0;
        }
        let step = self.step_interval().as_nanos();
        if step == 0 {
            return 0;
        }
        let pending = self.pending.saturating_add(elapsed).as_nanos();
        let remainder = u64::try_from(pending % step).unwrap_or(0);
        self.pending = Duration::from_nanos(remainder);
        u32::try_from(pending / step).unwrap_or(u32::MAX)
    }
}

/// Convert a level time limit to ticks.
pub fn seconds_to_ticks(seconds: u32, tick_ms: u64) -> u64 {
    u64::from(seconds) * 1000 / tick_ms.max(1)
}
