/// Fixed timestep accumulator.
/// Keeps per-step animation (snow, hover smoothing) at a consistent rate
/// regardless of display refresh, and drives the once-per-second countdown.
pub struct FixedTimestep {
    /// The fixed delta time per tick.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
    /// Most steps a single frame may produce.
    max_steps: u32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: 10,
        }
    }

    /// Cap the steps per frame. A backgrounded tab that resumes after minutes
    /// must not replay every missed step.
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        self.accumulator = self.accumulator.min(self.dt * self.max_steps as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }
}

/// Session clock: seconds since the scene started, as seen by animations.
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneClock {
    elapsed: f64,
}

impl SceneClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += f64::from(dt.max(0.0));
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_exact() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        let steps = ts.accumulate(1.0 / 60.0);
        assert_eq!(steps, 1);
    }

    #[test]
    fn accumulates_partial() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        let steps = ts.accumulate(0.008); // half a frame
        assert_eq!(steps, 0);
        let steps = ts.accumulate(0.010); // over one frame total
        assert_eq!(steps, 1);
    }

    #[test]
    fn caps_at_ten_steps() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        let steps = ts.accumulate(1.0); // 60 frames worth, but capped at 10
        assert_eq!(steps, 10);
    }

    #[test]
    fn one_second_interval_fires_once_after_a_long_pause() {
        let mut ts = FixedTimestep::new(1.0).with_max_steps(1);
        assert_eq!(ts.accumulate(0.4), 0);
        assert_eq!(ts.accumulate(0.7), 1);
        assert_eq!(ts.accumulate(120.0), 1);
        assert_eq!(ts.accumulate(0.0), 0);
    }

    #[test]
    fn negative_frame_time_is_ignored() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.accumulate(-5.0), 0);
        assert_eq!(ts.accumulate(1.0 / 60.0), 1);
    }

    #[test]
    fn clock_accumulates_elapsed_seconds() {
        let mut clock = SceneClock::new();
        clock.advance(0.5);
        clock.advance(0.25);
        clock.advance(-1.0);
        assert!((clock.elapsed() - 0.75).abs() < 1e-9);
    }
}
