//! Falling snow around the scene.
//!
//! Flakes fall at their own constant speed per fixed step, wrap from the
//! floor back up to the respawn height, and sway sideways on a shared sine
//! phased by flake index. Positions are kept packed (`x, y, z` per flake) so
//! the host can upload them as a point cloud without copying.

use serde::{Deserialize, Serialize};

use crate::systems::rng::Rng;

/// Snow field parameters, world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnowConfig {
    pub count: usize,
    /// Width and depth of the square the flakes spawn in, centred on the tree.
    pub spread: f32,
    /// Flakes spawn between 0 and this height.
    pub ceiling: f32,
    /// Flakes below this height wrap around.
    pub floor: f32,
    /// Height wrapped flakes restart from.
    pub respawn: f32,
    pub min_speed: f32,
    pub speed_range: f32,
    pub sway: f32,
}

impl Default for SnowConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            spread: 50.0,
            ceiling: 50.0,
            floor: -10.0,
            respawn: 40.0,
            min_speed: 0.05,
            speed_range: 0.1,
            sway: 0.01,
        }
    }
}

pub struct Snowfall {
    config: SnowConfig,
    positions: Vec<f32>,
    speeds: Vec<f32>,
}

impl Snowfall {
    pub fn new(config: SnowConfig, rng: &mut Rng) -> Self {
        let half = f64::from(config.spread) / 2.0;
        let mut positions = Vec::with_capacity(config.count * 3);
        let mut speeds = Vec::with_capacity(config.count);
        for _ in 0..config.count {
            positions.push(rng.range(-half, half) as f32);
            positions.push(rng.range(0.0, f64::from(config.ceiling)) as f32);
            positions.push(rng.range(-half, half) as f32);
            speeds.push(config.min_speed + rng.next_f64() as f32 * config.speed_range);
        }
        Self {
            config,
            positions,
            speeds,
        }
    }

    /// Advance every flake one fixed step.
    pub fn step(&mut self, elapsed: f64) {
        for (i, (flake, speed)) in self
            .positions
            .chunks_exact_mut(3)
            .zip(&self.speeds)
            .enumerate()
        {
            flake[1] -= *speed;
            if flake[1] < self.config.floor {
                flake[1] = self.config.respawn;
            }
            flake[0] += (elapsed + i as f64).sin() as f32 * self.config.sway;
        }
    }

    pub fn count(&self) -> usize {
        self.speeds.len()
    }

    /// Packed `x, y, z` per flake.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Raw pointer to the packed positions for zero-copy reads from JS.
    pub fn positions_ptr(&self) -> *const f32 {
        self.positions.as_ptr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Snowfall {
        Snowfall::new(SnowConfig::default(), &mut Rng::new(42))
    }

    #[test]
    fn spawns_inside_the_box() {
        let snow = field();
        assert_eq!(snow.count(), 1000);
        assert_eq!(snow.positions().len(), 3000);
        for flake in snow.positions().chunks_exact(3) {
            assert!(flake[0] >= -25.0 && flake[0] <= 25.0);
            assert!(flake[1] >= 0.0 && flake[1] <= 50.0);
            assert!(flake[2] >= -25.0 && flake[2] <= 25.0);
        }
    }

    #[test]
    fn flakes_fall_every_step() {
        let mut snow = field();
        let before: Vec<f32> = snow.positions().chunks_exact(3).map(|f| f[1]).collect();
        snow.step(0.0);
        for (flake, y0) in snow.positions().chunks_exact(3).zip(before) {
            let dy = y0 - flake[1];
            assert!((0.05 - 1e-4..=0.15 + 1e-4).contains(&dy), "fell {dy}");
        }
    }

    #[test]
    fn flakes_wrap_back_to_respawn_height() {
        let mut snow = field();
        for i in 0..2000 {
            snow.step(i as f64 / 60.0);
        }
        for flake in snow.positions().chunks_exact(3) {
            assert!(flake[1] >= -10.0 && flake[1] <= 50.0);
        }
    }

    #[test]
    fn sway_moves_sideways_only_a_little() {
        let mut snow = field();
        let x0 = snow.positions()[0];
        snow.step(1.0);
        assert!((snow.positions()[0] - x0).abs() <= 0.01 + 1e-6);
    }

    #[test]
    fn empty_field_is_fine() {
        let config = SnowConfig {
            count: 0,
            ..SnowConfig::default()
        };
        let mut snow = Snowfall::new(config, &mut Rng::new(1));
        snow.step(1.0);
        assert_eq!(snow.count(), 0);
    }
}
