//! Piecewise-conical model of the tree.
//!
//! The tree is drawn as stacked cone segments, so its radius is linear in
//! height inside each segment. Everything that hangs something "on" the tree
//! asks this model for the radius at a given height.

use serde::{Deserialize, Serialize};

/// Inward margin kept at both ends of a layer so nothing lands on a seam.
pub const SEAM_MARGIN: f64 = 0.2;

/// Radius reported for heights no layer covers (seams, below the base, above the apex).
pub const FALLBACK_RADIUS: f64 = 1.0;

/// One cone segment of the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeLayer {
    /// Base radius at the widest point.
    pub radius: f64,
    /// Vertical centre of the segment.
    pub center_height: f64,
    /// Vertical extent of the segment.
    pub height: f64,
    /// Foliage colour as `#rrggbb`. Cosmetic only.
    #[serde(default)]
    pub color: String,
}

impl TreeLayer {
    pub fn new(radius: f64, center_height: f64, height: f64, color: impl Into<String>) -> Self {
        Self {
            radius,
            center_height,
            height,
            color: color.into(),
        }
    }

    /// Height of the segment's base.
    pub fn bottom(&self) -> f64 {
        self.center_height - self.height / 2.0
    }

    /// Height of the segment's apex.
    pub fn top(&self) -> f64 {
        self.center_height + self.height / 2.0
    }

    /// Cone radius at `y`: full radius at the base, zero at the apex.
    /// No range check.
    pub fn radius_at(&self, y: f64) -> f64 {
        let ratio = (self.top() - y) / self.height;
        self.radius * ratio
    }

    /// Whether `y` lies inside the segment once the seam margins are removed.
    pub fn contains(&self, y: f64) -> bool {
        y >= self.bottom() + SEAM_MARGIN && y <= self.top() - SEAM_MARGIN
    }
}

/// Ordered layers, bottom to top. Fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeShape {
    layers: Vec<TreeLayer>,
}

impl TreeShape {
    pub fn new(layers: Vec<TreeLayer>) -> Self {
        Self { layers }
    }

    /// The four-layer tree the page ships with, spanning heights 0.5 to 7.25.
    pub fn reference() -> Self {
        Self::new(vec![
            TreeLayer::new(2.8, 2.0, 3.0, "#0f5132"),
            TreeLayer::new(2.3, 3.8, 2.5, "#156639"),
            TreeLayer::new(1.8, 5.3, 2.0, "#1c7b40"),
            TreeLayer::new(1.2, 6.5, 1.5, "#24904d"),
        ])
    }

    pub fn layers(&self) -> &[TreeLayer] {
        &self.layers
    }

    /// Cross-sectional radius at height `y`.
    ///
    /// The first layer (bottom to top) whose margin-trimmed span contains `y`
    /// wins. Never fails: uncovered heights get [`FALLBACK_RADIUS`].
    pub fn radius_at_height(&self, y: f64) -> f64 {
        self.layers
            .iter()
            .find(|layer| layer.contains(y))
            .map_or(FALLBACK_RADIUS, |layer| layer.radius_at(y))
    }
}

impl Default for TreeShape {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn reference_layers_grow_upwards_and_narrow() {
        let tree = TreeShape::reference();
        let layers = tree.layers();
        assert_eq!(layers.len(), 4);
        for pair in layers.windows(2) {
            assert!(pair[1].radius < pair[0].radius);
            assert!(pair[1].center_height > pair[0].center_height);
        }
        assert_eq!(layers[0].bottom(), 0.5);
        assert_eq!(layers[3].top(), 7.25);
    }

    #[test]
    fn radius_at_base_layer_center() {
        let tree = TreeShape::reference();
        // ratio = (3.5 - 2.0) / 3.0 = 0.5
        assert_eq!(tree.radius_at_height(2.0), 1.4);
    }

    #[test]
    fn radius_at_both_margins_of_base_layer() {
        let tree = TreeShape::reference();
        let base = &tree.layers()[0];

        let low = base.bottom() + SEAM_MARGIN + 1e-9;
        let expected = base.radius * (base.top() - low) / base.height;
        assert!((tree.radius_at_height(low) - expected).abs() < EPS);
        // Just inside the bottom margin the radius approaches the full layer radius
        // scaled by the trimmed fraction.
        assert!((tree.radius_at_height(low) - 2.8 * (2.8 / 3.0)).abs() < 1e-8);

        // Below the margin nothing covers the height.
        assert_eq!(tree.radius_at_height(base.bottom() + 0.1), FALLBACK_RADIUS);
    }

    #[test]
    fn radius_at_top_margin_of_apex_layer() {
        let tree = TreeShape::reference();
        let top = &tree.layers()[3];

        let high = top.top() - SEAM_MARGIN - 1e-9;
        let expected = top.radius * (SEAM_MARGIN + 1e-9) / top.height;
        assert!((tree.radius_at_height(high) - expected).abs() < 1e-8);

        assert_eq!(tree.radius_at_height(top.top() - 0.1), FALLBACK_RADIUS);
    }

    #[test]
    fn every_layer_end_resolves_to_the_lowest_covering_layer() {
        let tree = TreeShape::reference();
        let layers = tree.layers();
        let d = 1e-9;

        // Trimmed spans: 0.7..3.3, 2.75..4.85, 4.5..6.1, 5.95..7.05.
        // (layer, just inside bottom, just outside bottom, just inside top, just outside top)
        let owners: [(usize, Option<usize>, Option<usize>, Option<usize>, Option<usize>); 4] = [
            (0, Some(0), None, Some(0), Some(1)),
            (1, Some(0), Some(0), Some(1), Some(2)),
            (2, Some(1), Some(1), Some(2), Some(3)),
            (3, Some(2), Some(2), Some(3), None),
        ];

        let radius_from =
            |owner: Option<usize>, y: f64| owner.map_or(FALLBACK_RADIUS, |i| layers[i].radius_at(y));

        for (i, in_low, out_low, in_high, out_high) in owners {
            let low = layers[i].bottom() + SEAM_MARGIN;
            let high = layers[i].top() - SEAM_MARGIN;
            for (y, owner) in [
                (low + d, in_low),
                (low - d, out_low),
                (high - d, in_high),
                (high + d, out_high),
            ] {
                let got = tree.radius_at_height(y);
                let want = radius_from(owner, y);
                assert!((got - want).abs() < EPS, "layer {i} at y={y}: {got} != {want}");
            }
        }
    }

    #[test]
    fn seam_hands_off_to_the_next_layer() {
        let tree = TreeShape::reference();
        let layers = tree.layers();
        let seam = layers[0].top() - SEAM_MARGIN;
        assert_eq!(tree.radius_at_height(seam - 1e-9), layers[0].radius_at(seam - 1e-9));
        assert_eq!(tree.radius_at_height(seam + 1e-9), layers[1].radius_at(seam + 1e-9));
        // Layer 0 is near its apex at the seam, layer 1 is still wide.
        assert!(layers[1].radius_at(seam) > layers[0].radius_at(seam));
    }

    #[test]
    fn overlapping_layers_resolve_to_lowest() {
        let tree = TreeShape::reference();
        // 3.0 is inside both layer 0 (0.7..3.3) and layer 1 (2.75..4.85).
        let expected = tree.layers()[0].radius_at(3.0);
        assert_eq!(tree.radius_at_height(3.0), expected);
    }

    #[test]
    fn out_of_range_heights_fall_back() {
        let tree = TreeShape::reference();
        assert_eq!(tree.radius_at_height(100.0), FALLBACK_RADIUS);
        assert_eq!(tree.radius_at_height(-100.0), FALLBACK_RADIUS);
        assert_eq!(tree.radius_at_height(f64::NAN), FALLBACK_RADIUS);
    }

    #[test]
    fn empty_tree_always_falls_back() {
        let tree = TreeShape::new(Vec::new());
        assert_eq!(tree.radius_at_height(2.0), FALLBACK_RADIUS);
    }

    #[test]
    fn shape_round_trips_as_plain_array() {
        let json = r##"[{"radius":2.0,"center_height":1.0,"height":2.0}]"##;
        let tree: TreeShape = serde_json::from_str(json).unwrap();
        assert_eq!(tree.layers()[0].color, "");
        assert_eq!(tree.radius_at_height(1.0), 1.0);
    }
}
