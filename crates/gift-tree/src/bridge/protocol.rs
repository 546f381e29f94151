//! Frame buffer layout shared with the host renderer.
//! Must stay in sync with TypeScript `protocol.ts`.
//!
//! Layout (all values in f32 / 4 bytes):
//! ```text
//! [Header: 16 floats]
//! [Instances: max_instances × 12 floats]
//! [Snow: max_snow × 3 floats]
//! [Lights: max_lights × 8 floats]
//! ```
//!
//! Capacities are written into the header every frame, so the host can
//! compute section offsets without a separate handshake.

use crate::api::config::SceneConfig;
use crate::renderer::instance::SceneInstance;
use crate::systems::lighting::PointLight;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_FRAME_COUNTER: usize = 0;
pub const HEADER_PROTOCOL_VERSION: usize = 1;
pub const HEADER_MAX_INSTANCES: usize = 2;
pub const HEADER_INSTANCE_COUNT: usize = 3;
pub const HEADER_MAX_SNOW: usize = 4;
pub const HEADER_SNOW_COUNT: usize = 5;
pub const HEADER_MAX_LIGHTS: usize = 6;
pub const HEADER_LIGHT_COUNT: usize = 7;
pub const HEADER_AMBIENT: usize = 8;
pub const HEADER_TREE_YAW: usize = 9;
pub const HEADER_TREE_OFFSET_Y: usize = 10;
pub const HEADER_ELAPSED: usize = 11;
pub const HEADER_UNLOCKED: usize = 12;
/// Low 24 bits of the view revision; the host re-reads the snapshot when it changes.
pub const HEADER_VIEW_REVISION: usize = 13;
/// Requests sent and still waiting for a reply.
pub const HEADER_PENDING_REQUESTS: usize = 14;
// 15 reserved.

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per scene instance (wire format, never changes).
pub const INSTANCE_FLOATS: usize = SceneInstance::FLOATS;

/// Floats per snow flake: x, y, z.
pub const SNOW_FLOATS: usize = 3;

/// Floats per point light.
pub const LIGHT_FLOATS: usize = PointLight::FLOATS;

/// Buffer layout computed from capacities.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub max_instances: usize,
    pub max_snow: usize,
    pub max_lights: usize,

    pub instance_data_floats: usize,
    pub snow_data_floats: usize,
    pub light_data_floats: usize,

    /// Offset (in floats) where instance data begins.
    pub instance_data_offset: usize,
    /// Offset (in floats) where snow data begins.
    pub snow_data_offset: usize,
    /// Offset (in floats) where light data begins.
    pub light_data_offset: usize,

    pub buffer_total_floats: usize,
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    pub fn new(max_instances: usize, max_snow: usize, max_lights: usize) -> Self {
        let instance_data_floats = max_instances * INSTANCE_FLOATS;
        let snow_data_floats = max_snow * SNOW_FLOATS;
        let light_data_floats = max_lights * LIGHT_FLOATS;

        let instance_data_offset = HEADER_FLOATS;
        let snow_data_offset = instance_data_offset + instance_data_floats;
        let light_data_offset = snow_data_offset + snow_data_floats;

        let buffer_total_floats = light_data_offset + light_data_floats;

        Self {
            max_instances,
            max_snow,
            max_lights,
            instance_data_floats,
            snow_data_floats,
            light_data_floats,
            instance_data_offset,
            snow_data_offset,
            light_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }

    pub fn from_config(config: &SceneConfig) -> Self {
        Self::new(config.max_instances, config.snow.count, config.max_lights)
    }
}

/// Per-frame values the host reads before touching the data sections.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameHeader {
    pub frame: u32,
    pub instance_count: u32,
    pub snow_count: u32,
    pub light_count: u32,
    pub ambient: f32,
    pub tree_yaw: f32,
    pub tree_offset_y: f32,
    pub elapsed: f32,
    pub unlocked: bool,
    pub view_revision: u64,
    pub pending_requests: u32,
}

impl FrameHeader {
    /// Pack into the header floats for `layout`.
    pub fn write(&self, layout: &ProtocolLayout, out: &mut [f32; HEADER_FLOATS]) {
        *out = [0.0; HEADER_FLOATS];
        out[HEADER_FRAME_COUNTER] = self.frame as f32;
        out[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        out[HEADER_MAX_INSTANCES] = layout.max_instances as f32;
        out[HEADER_INSTANCE_COUNT] = self.instance_count as f32;
        out[HEADER_MAX_SNOW] = layout.max_snow as f32;
        out[HEADER_SNOW_COUNT] = self.snow_count as f32;
        out[HEADER_MAX_LIGHTS] = layout.max_lights as f32;
        out[HEADER_LIGHT_COUNT] = self.light_count as f32;
        out[HEADER_AMBIENT] = self.ambient;
        out[HEADER_TREE_YAW] = self.tree_yaw;
        out[HEADER_TREE_OFFSET_Y] = self.tree_offset_y;
        out[HEADER_ELAPSED] = self.elapsed;
        out[HEADER_UNLOCKED] = if self.unlocked { 1.0 } else { 0.0 };
        out[HEADER_VIEW_REVISION] = (self.view_revision & 0x00ff_ffff) as f32;
        out[HEADER_PENDING_REQUESTS] = self.pending_requests as f32;
    }
}
