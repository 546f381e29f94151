use crate::api::types::{Gift, GiftId, Memory, MemoryId};
use crate::core::placement::{
    place_gifts, place_memory_ornaments, scatter_decorations, Decoration, GiftSlot, MemoryBand,
    MemoryOrnament,
};
use crate::core::tree::TreeShape;
use crate::renderer::instance::hex_to_rgb;
use crate::systems::animation::{gift_bounce, HoverSmoother};
use crate::systems::rng::Rng;

/// Box colour used when a stored gift has none, or an unreadable one.
pub const DEFAULT_GIFT_COLOR: &str = "#d32f2f";

/// A gift box under the tree.
#[derive(Debug, Clone)]
pub struct GiftBox {
    pub id: GiftId,
    pub slot: GiftSlot,
    pub color: [f32; 3],
    pub opened: bool,
    pub hover: HoverSmoother,
}

/// A memory ornament plus its pointer state.
#[derive(Debug, Clone)]
pub struct PhotoOrnament {
    pub ornament: MemoryOrnament,
    pub hovered: bool,
}

/// Everything placed in the scene, derived from the current gift and memory
/// lists. Lists are never patched in place: each change rebuilds the derived
/// placement in full, carrying hover state over by id.
pub struct Scene {
    tree: TreeShape,
    band: MemoryBand,
    decorations: Vec<Decoration>,
    photos: Vec<PhotoOrnament>,
    gift_boxes: Vec<GiftBox>,
}

impl Scene {
    pub fn new(tree: TreeShape, band: MemoryBand) -> Self {
        Self {
            tree,
            band,
            decorations: Vec::new(),
            photos: Vec::new(),
            gift_boxes: Vec::new(),
        }
    }

    /// Scatter the session's decorations. Called once at start-up.
    pub fn decorate(&mut self, rng: &mut Rng) {
        self.decorations = scatter_decorations(&self.tree, rng);
    }

    pub fn set_memories(&mut self, memories: &[Memory]) {
        let hovered: Vec<MemoryId> = self
            .photos
            .iter()
            .filter(|p| p.hovered)
            .map(|p| p.ornament.source_id.clone())
            .collect();
        self.photos = place_memory_ornaments(memories, &self.tree, &self.band)
            .into_iter()
            .map(|ornament| PhotoOrnament {
                hovered: hovered.contains(&ornament.source_id),
                ornament,
            })
            .collect();
    }

    pub fn set_gifts(&mut self, gifts: &[Gift]) {
        let previous = std::mem::take(&mut self.gift_boxes);
        self.gift_boxes = gifts
            .iter()
            .zip(place_gifts(gifts.len()))
            .map(|(gift, slot)| GiftBox {
                id: gift.id.clone(),
                slot,
                color: hex_to_rgb(&gift.color)
                    .or_else(|| hex_to_rgb(DEFAULT_GIFT_COLOR))
                    .unwrap_or([1.0, 0.0, 0.0]),
                opened: gift.is_opened,
                hover: previous
                    .iter()
                    .find(|b| b.id == gift.id)
                    .map(|b| b.hover)
                    .unwrap_or_default(),
            })
            .collect();
    }

    /// Returns false when no box has this id.
    pub fn set_gift_hovered(&mut self, id: &GiftId, hovered: bool) -> bool {
        match self.gift_boxes.iter_mut().find(|b| &b.id == id) {
            Some(gift_box) => {
                gift_box.hover.hovered = hovered;
                true
            }
            None => false,
        }
    }

    /// Returns false when no ornament has this id.
    pub fn set_memory_hovered(&mut self, id: &MemoryId, hovered: bool) -> bool {
        match self.photos.iter_mut().find(|p| &p.ornament.source_id == id) {
            Some(photo) => {
                photo.hovered = hovered;
                true
            }
            None => false,
        }
    }

    /// Advance per-step animation state by one fixed step.
    pub fn step(&mut self, elapsed: f64) {
        for gift_box in &mut self.gift_boxes {
            let pos = gift_box.slot.position;
            gift_box.hover.step(gift_bounce(elapsed, pos.x, pos.z));
        }
    }

    pub fn tree(&self) -> &TreeShape {
        &self.tree
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    pub fn photos(&self) -> &[PhotoOrnament] {
        &self.photos
    }

    pub fn memory_ornaments(&self) -> impl Iterator<Item = &MemoryOrnament> {
        self.photos.iter().map(|p| &p.ornament)
    }

    pub fn gift_boxes(&self) -> &[GiftBox] {
        &self.gift_boxes
    }

    /// Instances one frame of this scene needs: trunk, layers, star,
    /// decorations, photo ornaments and gift boxes.
    pub fn instance_count(&self) -> usize {
        2 + self.tree.layers().len() + self.decorations.len() + self.photos.len() + self.gift_boxes.len()
    }
}
