//! Per-frame motion as pure functions of elapsed time.
//!
//! Nothing here touches a rendering context; the frame builder samples these
//! with the scene clock. The only stateful piece is [`HoverSmoother`], which
//! eases towards a target one fixed step at a time.

/// Tree yaw speed, radians per second.
pub const TREE_SPIN_RATE: f64 = 0.08;
/// Photo ornament spin, radians per second (0.01 rad per 60 Hz frame).
pub const PHOTO_SPIN_RATE: f64 = 0.6;
/// Resting height of the star, tree-local.
pub const STAR_HEIGHT: f64 = 7.5;

const BOUNCE_SPEED: f64 = 2.0;
const BOUNCE_AMPLITUDE: f64 = 0.05;
const TWINKLE_SPEED: f64 = 3.0;
const TWINKLE_PHASE_SCALE: f64 = 10.0;
const STAR_FLOAT_SPEED: f64 = 1.5;
const STAR_FLOAT_INTENSITY: f64 = 0.2;
const STAR_ROTATION_INTENSITY: f64 = 0.2;

const HOVER_SCALE: f64 = 1.15;
const HOVER_LIFT: f64 = 0.25;
/// Fraction of the remaining distance covered per fixed step.
const HOVER_SMOOTHING: f64 = 0.1;

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Yaw of the whole tree group.
pub fn tree_yaw(elapsed: f64) -> f64 {
    elapsed * TREE_SPIN_RATE
}

/// Idle vertical bob of a gift box. Phase comes from the box's ground position
/// so neighbouring boxes do not move in lockstep.
pub fn gift_bounce(elapsed: f64, x: f64, z: f64) -> f64 {
    (elapsed * BOUNCE_SPEED + x * z).sin() * BOUNCE_AMPLITUDE
}

/// Photo ornament twinkle in [0, 1], phased by the ornament's x position.
pub fn photo_twinkle(elapsed: f64, x: f64) -> f64 {
    (elapsed * TWINKLE_SPEED + x * TWINKLE_PHASE_SCALE).sin() * 0.5 + 0.5
}

/// Self-rotation of a photo ornament.
pub fn photo_spin(elapsed: f64) -> f64 {
    elapsed * PHOTO_SPIN_RATE
}

/// Vertical float offset of the star.
pub fn star_float(elapsed: f64) -> f64 {
    (elapsed / 4.0 * STAR_FLOAT_SPEED).sin() / 10.0 * STAR_FLOAT_INTENSITY
}

/// Yaw wobble of the star.
pub fn star_wobble(elapsed: f64) -> f64 {
    (elapsed / 4.0 * STAR_FLOAT_SPEED).sin() / 8.0 * STAR_ROTATION_INTENSITY
}

/// Eased hover response of one gift box: grows and lifts while hovered,
/// settles back otherwise, and carries the idle bounce in its lift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverSmoother {
    pub hovered: bool,
    scale: f64,
    lift: f64,
}

impl HoverSmoother {
    pub fn new() -> Self {
        Self {
            hovered: false,
            scale: 1.0,
            lift: 0.0,
        }
    }

    /// Advance one fixed step. `bounce` is this step's [`gift_bounce`].
    pub fn step(&mut self, bounce: f64) {
        let (target_scale, target_lift) = if self.hovered {
            (HOVER_SCALE, HOVER_LIFT)
        } else {
            (1.0, 0.0)
        };
        self.scale = lerp(self.scale, target_scale, HOVER_SMOOTHING);
        self.lift = lerp(self.lift, target_lift + bounce, HOVER_SMOOTHING);
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn lift(&self) -> f64 {
        self.lift
    }
}

impl Default for HoverSmoother {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(2.0, 4.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 4.0, 1.0), 4.0);
        assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
    }

    #[test]
    fn tree_turns_slowly() {
        assert_eq!(tree_yaw(0.0), 0.0);
        assert!((tree_yaw(10.0) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn bounce_stays_small() {
        for i in 0..200 {
            let b = gift_bounce(i as f64 * 0.1, 3.0, -2.0);
            assert!(b.abs() <= BOUNCE_AMPLITUDE);
        }
    }

    #[test]
    fn twinkle_is_normalised_and_phased() {
        for i in 0..200 {
            let t = photo_twinkle(i as f64 * 0.05, 0.3);
            assert!((0.0..=1.0).contains(&t));
        }
        assert_ne!(photo_twinkle(1.0, 0.0), photo_twinkle(1.0, 0.5));
    }

    #[test]
    fn photo_spin_matches_per_frame_rate() {
        assert!((photo_spin(1.0 / 60.0) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn star_float_range() {
        for i in 0..500 {
            let t = i as f64 * 0.1;
            assert!(star_float(t).abs() <= 0.02 + 1e-12);
            assert!(star_wobble(t).abs() <= 0.025 + 1e-12);
        }
    }

    #[test]
    fn hover_converges_to_target() {
        let mut hover = HoverSmoother::new();
        hover.hovered = true;
        for _ in 0..200 {
            hover.step(0.0);
        }
        assert!((hover.scale() - HOVER_SCALE).abs() < 1e-6);
        assert!((hover.lift() - HOVER_LIFT).abs() < 1e-6);

        hover.hovered = false;
        for _ in 0..200 {
            hover.step(0.0);
        }
        assert!((hover.scale() - 1.0).abs() < 1e-6);
        assert!(hover.lift().abs() < 1e-6);
    }

    #[test]
    fn hover_moves_a_tenth_per_step() {
        let mut hover = HoverSmoother::new();
        hover.hovered = true;
        hover.step(0.0);
        assert!((hover.scale() - 1.015).abs() < 1e-12);
        assert!((hover.lift() - 0.025).abs() < 1e-12);
    }
}
