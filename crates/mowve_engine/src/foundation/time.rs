//! Frame timing
//!
//! The game simulates in fixed per-frame steps, so the clock does not report
//! seconds. It reports a frame-rate-normalised multiplier: `1.0` means exactly
//! one frame at the desired rate elapsed since the previous tick.

use std::time::{Duration, Instant};

/// Monotonic frame clock producing a frame-normalised delta
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_tick: Instant,
    desired_fps: f32,
    delta: f32,
    total_time: Duration,
    frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(60.0)
    }
}

impl FrameClock {
    /// Create a clock targeting `desired_fps`
    pub fn new(desired_fps: f32) -> Self {
        Self {
            last_tick: Instant::now(),
            desired_fps,
            delta: 0.0,
            total_time: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advance the clock to now (call once per frame)
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Advance the clock to `now`
    ///
    /// A `now` earlier than the previous tick counts as zero elapsed time.
    pub fn tick_at(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.delta = elapsed.as_secs_f32() * self.desired_fps;
        self.total_time += elapsed;
        self.last_tick = now;
        self.frame_count += 1;
    }

    /// Frames elapsed at the desired rate since the previous tick
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Target frame rate
    pub fn desired_fps(&self) -> f32 {
        self.desired_fps
    }

    /// Total time since the clock was created
    pub fn total_time(&self) -> Duration {
        self.total_time
    }

    /// Number of ticks so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_delta_is_frame_normalised() {
        let mut clock = FrameClock::new(60.0);
        let start = clock.last_tick;
        clock.tick_at(start + Duration::from_millis(50));
        // 50ms at 60fps is three frames
        assert_relative_eq!(clock.delta(), 3.0, epsilon = 1e-4);
        assert_eq!(clock.frame_count(), 1);
    }

    #[test]
    fn test_backwards_time_is_zero_delta() {
        let mut clock = FrameClock::new(60.0);
        let start = clock.last_tick;
        clock.tick_at(start + Duration::from_millis(10));
        clock.tick_at(start);
        assert_relative_eq!(clock.delta(), 0.0);
        assert_eq!(clock.total_time(), Duration::from_millis(10));
    }
}
