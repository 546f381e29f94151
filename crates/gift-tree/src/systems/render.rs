use glam::Vec3;

use crate::core::scene::Scene;
use crate::renderer::instance::{hex_to_rgb, FrameBuffer, InstanceKind, SceneInstance};
use crate::systems::animation::{photo_spin, photo_twinkle, star_float, star_wobble, STAR_HEIGHT};
use crate::systems::lighting::{LightState, PointLight};

const TRUNK_CENTER_Y: f32 = 1.0;
const TRUNK_RADIUS: f32 = 0.6;
const TRUNK_HEIGHT: f32 = 2.5;
const TRUNK_COLOR: [f32; 3] = [0x46 as f32 / 255.0, 0x31 as f32 / 255.0, 0x25 as f32 / 255.0];

const GOLD: [f32; 3] = [1.0, 0xd7 as f32 / 255.0, 0.0];
const STAR_SIZE: f32 = 0.5;
const STAR_GLOW: f32 = 2.0;

const DECORATION_GLOW: f32 = 0.2;

const PHOTO_SIZE: f32 = 0.25;
const PHOTO_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
const PHOTO_HOVER_COLOR: [f32; 3] = [1.0, 0xaa as f32 / 255.0, 0xaa as f32 / 255.0];

const KEY_LIGHT_POS: Vec3 = Vec3::new(10.0, 10.0, 10.0);
const KEY_LIGHT_INTENSITY: f32 = 1.5;
const STAR_LIGHT_INTENSITY: f32 = 2.0;
const STAR_LIGHT_DISTANCE: f32 = 8.0;
const GIFT_GLOW_COLOR: [f32; 3] = [1.0, 0xaa as f32 / 255.0, 0.0];
const GIFT_GLOW_INTENSITY: f32 = 2.0;
const GIFT_GLOW_DISTANCE: f32 = 2.0;
/// Glow sits just above the open top face of the box.
const GIFT_GLOW_HEIGHT: f32 = 0.6;

/// Write every visible object for this frame into `buffer`.
///
/// Order: trunk, tree layers, star, decorations, photo ornaments, gift boxes.
pub fn build_frame(scene: &Scene, elapsed: f64, buffer: &mut FrameBuffer) {
    buffer.clear();

    buffer.push(
        SceneInstance::new(InstanceKind::Trunk)
            .with_pos([0.0, TRUNK_CENTER_Y, 0.0])
            .with_size(TRUNK_RADIUS, TRUNK_HEIGHT)
            .with_color(TRUNK_COLOR),
    );

    for layer in scene.tree().layers() {
        buffer.push(
            SceneInstance::new(InstanceKind::TreeLayer)
                .with_pos([0.0, layer.center_height as f32, 0.0])
                .with_size(layer.radius as f32, layer.height as f32)
                .with_color(hex_to_rgb(&layer.color).unwrap_or(TRUNK_COLOR)),
        );
    }

    buffer.push(
        SceneInstance::new(InstanceKind::Star)
            .with_pos([0.0, (STAR_HEIGHT + star_float(elapsed)) as f32, 0.0])
            .with_yaw(star_wobble(elapsed) as f32)
            .with_size(STAR_SIZE, STAR_SIZE)
            .with_color(GOLD)
            .with_glow(STAR_GLOW),
    );

    for decoration in scene.decorations() {
        buffer.push(
            SceneInstance::new(InstanceKind::Decoration)
                .with_pos(decoration.position.as_vec3().to_array())
                .with_size(decoration.scale as f32, decoration.scale as f32)
                .with_color(hex_to_rgb(decoration.color).unwrap_or(PHOTO_COLOR))
                .with_glow(DECORATION_GLOW),
        );
    }

    let spin = photo_spin(elapsed) as f32;
    for (i, photo) in scene.photos().iter().enumerate() {
        let pos = photo.ornament.position;
        let color = if photo.hovered {
            PHOTO_HOVER_COLOR
        } else {
            PHOTO_COLOR
        };
        buffer.push(
            SceneInstance::new(InstanceKind::PhotoOrnament)
                .with_index(i)
                .with_pos(pos.as_vec3().to_array())
                .with_yaw(spin)
                .with_size(PHOTO_SIZE, PHOTO_SIZE)
                .with_color(color)
                .with_glow(photo_twinkle(elapsed, pos.x) as f32),
        );
    }

    for (i, gift_box) in scene.gift_boxes().iter().enumerate() {
        let ground = gift_box.slot.position.as_vec3();
        let lift = gift_box.hover.lift() as f32;
        buffer.push(
            SceneInstance::new(InstanceKind::GiftBox)
                .with_index(i)
                .with_pos([ground.x, ground.y + lift, ground.z])
                .with_yaw(gift_box.slot.yaw as f32)
                .with_size(gift_box.hover.scale() as f32, if gift_box.opened { 1.0 } else { 0.0 })
                .with_color(gift_box.color),
        );
    }
}

/// Rebuild the light list: key light, star light, then one glow per opened gift
/// until the capacity runs out. Positions are in world space.
pub fn build_lights(scene: &Scene, elapsed: f64, tree_offset_y: f32, lights: &mut LightState) {
    lights.clear();
    lights.add(PointLight::new(KEY_LIGHT_POS, [1.0; 3], KEY_LIGHT_INTENSITY, 0.0));

    let star_y = (STAR_HEIGHT + star_float(elapsed)) as f32 + tree_offset_y;
    lights.add(PointLight::new(
        Vec3::new(0.0, star_y, 0.0),
        GOLD,
        STAR_LIGHT_INTENSITY,
        STAR_LIGHT_DISTANCE,
    ));

    for gift_box in scene.gift_boxes().iter().filter(|b| b.opened) {
        let ground = gift_box.slot.position.as_vec3();
        let pos = ground + Vec3::Y * (gift_box.hover.lift() as f32 + GIFT_GLOW_HEIGHT);
        if !lights.add(PointLight::new(pos, GIFT_GLOW_COLOR, GIFT_GLOW_INTENSITY, GIFT_GLOW_DISTANCE)) {
            break;
        }
    }
}
