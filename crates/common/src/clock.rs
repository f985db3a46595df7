//! Run clock and pacing utilities for the export pipeline.
//!
//! The export replay does not need wall-clock accuracy: the pauses between
//! frames only give layout and scrolling time to settle before capture. This
//! module keeps those conversions in one place:
//! - Anchoring a run to a monotonic epoch for stage timings
//! - Converting reveal delays into settle pauses
//! - Mapping stage-local progress into overall run progress

use std::time::{Duration, Instant};

/// Monotonic clock anchored at the start of one export run.
#[derive(Debug, Clone)]
pub struct RunClock {
    /// The instant the run started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,

    /// Instant the current stage started.
    stage_start: Instant,
}

impl RunClock {
    /// Create a new run clock anchored to now.
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            epoch: now,
            epoch_wall: chrono::Utc::now().to_rfc3339(),
            stage_start: now,
        }
    }

    /// Milliseconds elapsed since the run started.
    pub fn elapsed_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Wall-clock time at run start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Close the current stage and return its duration in milliseconds.
    pub fn lap_ms(&mut self) -> u64 {
        let now = Instant::now();
        let lap = now.duration_since(self.stage_start).as_millis() as u64;
        self.stage_start = now;
        lap
    }
}

/// Pause before capturing a freshly revealed message.
///
/// `reveal_delay_secs` is the conversation's reveal delay; `pacing_factor`
/// scales it down to a sub-second settle window.
pub fn reveal_pause(reveal_delay_secs: u8, pacing_factor: f64) -> Duration {
    let secs = f64::from(reveal_delay_secs) * pacing_factor.max(0.0);
    if secs.is_nan() {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Extra pause after a forced scroll-to-bottom.
pub fn scroll_settle(settle_ms: u64) -> Duration {
    Duration::from_millis(settle_ms)
}

/// Split of overall progress between the capture and encode stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressWeights {
    capture: f64,
}

/// Highest fraction reported while work is still in flight. Exactly `1.0` is
/// reserved for a finished run.
pub const MAX_IN_FLIGHT_PROGRESS: f64 = 0.99;

impl ProgressWeights {
    /// `capture` is clamped into `[0.0, 1.0]`.
    pub fn new(capture: f64) -> Self {
        Self {
            capture: capture.clamp(0.0, 1.0),
        }
    }

    /// Capture share of the total.
    pub fn capture(&self) -> f64 {
        self.capture
    }

    /// Overall progress after `captured` of `total` frames.
    pub fn capturing(&self, captured: usize, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let ratio = (captured as f64 / total as f64).clamp(0.0, 1.0);
        (ratio * self.capture).min(MAX_IN_FLIGHT_PROGRESS)
    }

    /// Overall progress for encoder sub-progress `p` in `[0.0, 1.0]`.
    pub fn encoding(&self, p: f64) -> f64 {
        let p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
        (self.capture + p * (1.0 - self.capture)).min(MAX_IN_FLIGHT_PROGRESS)
    }
}

impl Default for ProgressWeights {
    fn default() -> Self {
        Self::new(0.8)
    }
}
