//! Frame clock
//!
//! Converts host frame timestamps into a bounded per-frame delta. A stalled or
//! backgrounded host produces one capped step rather than a burst of catch-up
//! ticks, so game time lags wall-clock time after a stall.

/// Clamp a raw frame delta to `[0, max_dt]` (NaN becomes 0)
#[inline]
pub fn clamp_frame_dt(dt: f32, max_dt: f32) -> f32 {
    if dt.is_nan() { 0.0 } else { dt.clamp(0.0, max_dt) }
}

/// Tracks the previous host timestamp
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt: f32,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_ms: None,
            max_dt,
        }
    }

    /// Delta for a frame delivered at `now_ms` (milliseconds, monotonic)
    ///
    /// The first frame after construction or [`FrameClock::reset`] yields 0.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        clamp_frame_dt(dt, self.max_dt)
    }

    /// Forget the previous timestamp (e.g. after the host was hidden)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
