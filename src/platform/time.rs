//! Frame timing
//!
//! Turns display-refresh timestamps into simulation deltas. The first frame
//! after a reset only records the baseline.

use crate::consts::MAX_FRAME_DT;

#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a timestamp in milliseconds. Returns the elapsed seconds since the
    /// previous call, or None on the baseline frame.
    pub fn advance(&mut self, now_ms: f64) -> Option<f32> {
        let prev = self.last_ms.replace(now_ms)?;
        let dt = ((now_ms - prev) / 1000.0) as f32;
        Some(dt.clamp(0.0, MAX_FRAME_DT))
    }

    /// Forget the baseline (loop stopped)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    pub fn is_running(&self) -> bool {
        self.last_ms.is_some()
    }
}
