//! Where things hang on (and sit under) the tree.
//!
//! Three independent placements live here:
//! - memory ornaments: deterministic, keyed only by list index and length;
//! - decorations: random per session, one batch per layer;
//! - gift boxes: a ring around the trunk on the ground.
//!
//! Tree-local coordinates throughout except for gift boxes, which are placed
//! in world space.

use std::f64::consts::{PI, TAU};

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::api::types::{Memory, MemoryId};
use crate::core::tree::TreeShape;
use crate::systems::rng::Rng;

/// Decorations per layer before the per-layer reduction.
const DECORATIONS_BASE: usize = 12;
/// Each layer up gets this many fewer decorations.
const DECORATIONS_STEP: usize = 2;
/// Vertical margin kept at both ends of a layer when scattering decorations.
const DECORATION_MARGIN: f64 = 0.3;
/// Decorations sit just on the cone surface.
const DECORATION_OFFSET: f64 = 0.05;
const DECORATION_GOLD: &str = "#d4af37";
const DECORATION_RED: &str = "#c92a2a";
const DECORATION_WHITE: &str = "#ffffff";

/// Gift boxes rest at this world height.
pub const GIFT_GROUND_Y: f64 = -1.6;
const GIFT_RING_RADIUS: f64 = 3.0;
const GIFT_RING_STAGGER: f64 = 0.5;

/// The golden angle, `π(3 − √5)` ≈ 2.399963 rad.
pub fn golden_angle() -> f64 {
    PI * (3.0 - 5f64.sqrt())
}

/// Angular step between consecutive memory ornaments: the golden angle
/// stretched five times for a looser, hand-hung spread.
pub fn memory_angle_step() -> f64 {
    golden_angle() * 5.0
}

/// Vertical band memory ornaments are spread over, and how far they float
/// off the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryBand {
    pub min_height: f64,
    pub max_height: f64,
    pub surface_offset: f64,
}

impl Default for MemoryBand {
    fn default() -> Self {
        Self {
            min_height: 1.8,
            max_height: 6.8,
            surface_offset: 0.25,
        }
    }
}

/// Placement of one memory on the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryOrnament {
    pub source_id: MemoryId,
    pub image_url: String,
    pub caption: Option<String>,
    pub position: DVec3,
}

/// Height and angle of ornament `index` out of `count`.
fn memory_slot(index: usize, count: usize, band: &MemoryBand) -> (f64, f64) {
    let span = band.max_height - band.min_height;
    let t = index as f64 / count.saturating_sub(1).max(1) as f64;
    let y = band.min_height + t * span;
    let angle = index as f64 * memory_angle_step();
    (y, angle)
}

/// Place every memory just outside the tree surface.
///
/// Pure function of each memory's index, the list length and the tree: the
/// same list always yields the same layout, and reordering the list moves
/// the ornaments.
pub fn place_memory_ornaments(
    memories: &[Memory],
    tree: &TreeShape,
    band: &MemoryBand,
) -> Vec<MemoryOrnament> {
    let count = memories.len();
    memories
        .iter()
        .enumerate()
        .map(|(i, memory)| {
            let (y, angle) = memory_slot(i, count, band);
            let r = tree.radius_at_height(y) + band.surface_offset;
            MemoryOrnament {
                source_id: memory.id.clone(),
                image_url: memory.photo_url.clone(),
                caption: memory.message.clone(),
                position: DVec3::new(angle.sin() * r, y, angle.cos() * r),
            }
        })
        .collect()
}

/// A purely cosmetic bauble.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decoration {
    pub position: DVec3,
    pub color: &'static str,
    pub scale: f64,
}

/// Scatter random baubles over every layer.
///
/// Layer `i` receives `12 - 2i` baubles at uniform heights (0.3 margin at
/// each end) and uniform angles. Not deterministic across seeds.
pub fn scatter_decorations(tree: &TreeShape, rng: &mut Rng) -> Vec<Decoration> {
    let mut items = Vec::new();
    for (i, layer) in tree.layers().iter().enumerate() {
        let count = DECORATIONS_BASE.saturating_sub(i * DECORATIONS_STEP);
        let low = layer.bottom() + DECORATION_MARGIN;
        let high = layer.top() - DECORATION_MARGIN;
        for _ in 0..count {
            let y = rng.range(low, high);
            let r = layer.radius_at(y) + DECORATION_OFFSET;
            let angle = rng.next_f64() * TAU;
            let color = if rng.next_f64() > 0.6 {
                DECORATION_GOLD
            } else if rng.next_f64() > 0.5 {
                DECORATION_RED
            } else {
                DECORATION_WHITE
            };
            items.push(Decoration {
                position: DVec3::new(angle.sin() * r, y, angle.cos() * r),
                color,
                scale: 0.12 + rng.next_f64() * 0.08,
            });
        }
    }
    items
}

/// Where a gift box sits around the trunk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GiftSlot {
    pub position: DVec3,
    /// Rotation about the vertical axis so the label faces outwards.
    pub yaw: f64,
}

/// Spread `count` gift boxes evenly on a staggered ring (radii 3, 3.5, 4).
pub fn place_gifts(count: usize) -> Vec<GiftSlot> {
    (0..count)
        .map(|idx| {
            let theta = idx as f64 / count as f64 * TAU;
            let ring = GIFT_RING_RADIUS + (idx % 3) as f64 * GIFT_RING_STAGGER;
            GiftSlot {
                position: DVec3::new(theta.sin() * ring, GIFT_GROUND_Y, theta.cos() * ring),
                yaw: theta,
            }
        })
        .collect()
}
