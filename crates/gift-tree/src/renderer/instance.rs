use bytemuck::{Pod, Zeroable};

/// What a [`SceneInstance`] draws. Sent as its `f32` discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum InstanceKind {
    Trunk = 0,
    TreeLayer = 1,
    Star = 2,
    Decoration = 3,
    PhotoOrnament = 4,
    GiftBox = 5,
}

/// Per-instance scene data read by the TypeScript renderer.
/// Must match the TypeScript protocol: 12 floats = 48 bytes stride.
///
/// Tree parts (trunk, layers, star, decorations, photo ornaments) are in
/// tree-local coordinates; the renderer applies the tree yaw and offset from
/// the frame header. Gift boxes are in world coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct SceneInstance {
    /// [`InstanceKind`] discriminant.
    pub kind: f32,
    /// Index into the gift or memory list for pickable instances, -1 otherwise.
    pub index: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Rotation about the vertical axis, radians.
    pub yaw: f32,
    /// Radius or uniform scale, depending on kind.
    pub size: f32,
    /// Height for cones; lid-open flag (0/1) for gift boxes.
    pub extent: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    /// Emissive strength. Photo ornaments put their twinkle here.
    pub glow: f32,
}

impl SceneInstance {
    pub const FLOATS: usize = 12;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn new(kind: InstanceKind) -> Self {
        Self {
            kind: kind as u32 as f32,
            index: -1.0,
            ..Self::default()
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index as f32;
        self
    }

    pub fn with_pos(mut self, pos: [f32; 3]) -> Self {
        [self.x, self.y, self.z] = pos;
        self
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn with_size(mut self, size: f32, extent: f32) -> Self {
        self.size = size;
        self.extent = extent;
        self
    }

    pub fn with_color(mut self, rgb: [f32; 3]) -> Self {
        [self.r, self.g, self.b] = rgb;
        self
    }

    pub fn with_glow(mut self, glow: f32) -> Self {
        self.glow = glow;
        self
    }
}

/// Parse `#rrggbb` (or `rrggbb`) into linear 0..1 channels.
pub fn hex_to_rgb(hex: &str) -> Option<[f32; 3]> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .ok()
            .map(|v| f32::from(v) / 255.0)
    };
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Instances for one frame.
pub struct FrameBuffer {
    instances: Vec<SceneInstance>,
    max_instances: usize,
    dropped: usize,
}

impl FrameBuffer {
    pub fn with_capacity(max_instances: usize) -> Self {
        Self {
            instances: Vec::with_capacity(max_instances),
            max_instances,
            dropped: 0,
        }
    }

    /// Raise the capacity to `max_instances`. Never shrinks.
    pub fn grow(&mut self, max_instances: usize) {
        if max_instances > self.max_instances {
            self.instances.reserve(max_instances - self.instances.len());
            self.max_instances = max_instances;
        }
    }

    pub fn max_instances(&self) -> usize {
        self.max_instances
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.dropped = 0;
    }

    /// Append an instance; beyond capacity it is counted and dropped.
    pub fn push(&mut self, instance: SceneInstance) {
        if self.instances.len() < self.max_instances {
            self.instances.push(instance);
        } else {
            self.dropped += 1;
        }
    }

    pub fn instances(&self) -> &[SceneInstance] {
        &self.instances
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Instances that did not fit this frame.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Raw pointer to instance data for zero-copy reads from JS.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }
}
