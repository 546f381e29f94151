//! Point lights for the scene.
//!
//! The key light is fixed; the star's light and the glow inside every opened
//! gift are rebuilt each frame. The renderer reads them as a flat f32 array.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// A 3D point light with position, colour, intensity and reach.
///
/// Wire format (8 floats / 32 bytes):
/// `[x, y, z, r, g, b, intensity, distance]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct PointLight {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub intensity: f32,
    /// Falloff distance in world units; 0 means unlimited.
    pub distance: f32,
}

impl PointLight {
    pub const FLOATS: usize = 8;

    /// Create a new point light at the given world position.
    pub fn new(pos: Vec3, color: [f32; 3], intensity: f32, distance: f32) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            z: pos.z,
            r: color[0],
            g: color[1],
            b: color[2],
            intensity,
            distance,
        }
    }

    pub fn pos(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Active lights plus the ambient term, bounded by a capacity.
pub struct LightState {
    lights: Vec<PointLight>,
    max_lights: usize,
    ambient: f32,
}

impl LightState {
    pub fn with_capacity(max_lights: usize) -> Self {
        Self {
            lights: Vec::with_capacity(max_lights),
            max_lights,
            ambient: 0.5,
        }
    }

    /// Add a light. Returns false (and drops it) once the capacity is reached.
    pub fn add(&mut self, light: PointLight) -> bool {
        if self.lights.len() >= self.max_lights {
            return false;
        }
        self.lights.push(light);
        true
    }

    pub fn clear(&mut self) {
        self.lights.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointLight> {
        self.lights.iter()
    }

    pub fn count(&self) -> usize {
        self.lights.len()
    }

    pub fn set_ambient(&mut self, intensity: f32) {
        self.ambient = intensity;
    }

    pub fn ambient(&self) -> f32 {
        self.ambient
    }

    /// Pointer to the lights data for zero-copy reads from JS.
    pub fn buffer_ptr(&self) -> *const f32 {
        self.lights.as_ptr() as *const f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_light_new() {
        let light = PointLight::new(Vec3::new(10.0, 10.0, 10.0), [1.0, 0.5, 0.0], 1.5, 0.0);
        assert_eq!(light.pos(), Vec3::splat(10.0));
        assert_eq!(light.r, 1.0);
        assert_eq!(light.g, 0.5);
        assert_eq!(light.b, 0.0);
        assert_eq!(light.intensity, 1.5);
        assert_eq!(light.distance, 0.0);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut state = LightState::with_capacity(2);
        assert!(state.add(PointLight::default()));
        assert!(state.add(PointLight::default()));
        assert!(!state.add(PointLight::default()));
        assert_eq!(state.count(), 2);

        state.clear();
        assert_eq!(state.count(), 0);
    }

    #[test]
    fn ambient_defaults_to_half() {
        let mut state = LightState::with_capacity(1);
        assert_eq!(state.ambient(), 0.5);
        state.set_ambient(0.2);
        assert_eq!(state.ambient(), 0.2);
    }

    #[test]
    fn point_light_is_8_floats() {
        assert_eq!(std::mem::size_of::<PointLight>(), PointLight::FLOATS * 4);
    }
}
