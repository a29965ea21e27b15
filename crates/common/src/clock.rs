//! Clock and tick pacing utilities.
//!
//! A session is anchored to a monotonic epoch recorded at start. The
//! elapsed time drives the ambient camera drift, and [`RateController`]
//! paces render ticks when replaying timestamped detector output.

use std::time::Instant;

/// A session clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment the session started).
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant the session started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new session clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get nanoseconds elapsed since session start.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Get seconds elapsed since session start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// Longest gap, in seconds, that [`RateController::ticks_until`] replays
/// tick by tick.
pub const MAX_CATCH_UP_SECS: u64 = 10;

/// Fixed-rate tick pacing against an external timestamp source.
#[derive(Debug)]
pub struct RateController {
    target_interval_ns: u64,
    last_tick_ns: Option<u64>,
    max_catch_up: u64,
}

impl RateController {
    /// Create a controller targeting the given Hz rate.
    pub fn new(target_hz: u32) -> Self {
        let hz = u64::from(target_hz.max(1));
        Self {
            target_interval_ns: 1_000_000_000 / hz,
            last_tick_ns: None,
            max_catch_up: hz * MAX_CATCH_UP_SECS,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        match self.last_tick_ns {
            None => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            // Past the end of the timestamp range nothing is ever due again.
            Some(last) => match last.checked_add(self.target_interval_ns) {
                Some(next) if current_ns >= next => {
                    self.last_tick_ns = Some(next);
                    true
                }
                _ => false,
            },
        }
    }

    /// Number of ticks due up to `current_ns`, consuming them.
    ///
    /// Unlike [`should_tick`](Self::should_tick) this catches up on every
    /// interval that elapsed, so a gap between samples still yields one tick
    /// per interval. A gap longer than [`MAX_CATCH_UP_SECS`] yields that many
    /// seconds of ticks and re-anchors the schedule at `current_ns`.
    pub fn ticks_until(&mut self, current_ns: u64) -> u64 {
        let Some(last) = self.last_tick_ns else {
            self.last_tick_ns = Some(current_ns);
            return 1;
        };

        let due = current_ns.saturating_sub(last) / self.target_interval_ns;
        if due > self.max_catch_up {
            tracing::debug!(
                gap_ns = current_ns - last,
                ticks = self.max_catch_up,
                "Timestamp gap too large, re-anchoring tick schedule"
            );
            self.last_tick_ns = Some(current_ns);
            return self.max_catch_up;
        }

        // due * interval <= current_ns - last, so this cannot overflow.
        self.last_tick_ns = Some(last + due * self.target_interval_ns);
        due
    }

    /// Timestamp of the most recent tick, if any.
    pub fn last_tick_ns(&self) -> Option<u64> {
        self.last_tick_ns
    }

    /// Target interval in nanoseconds.
    pub fn interval_ns(&self) -> u64 {
        self.target_interval_ns
    }
}
