use serde::{Deserialize, Serialize};

use crate::bridge::backend::BackendConfig;
use crate::core::placement::MemoryBand;
use crate::core::tree::TreeShape;
use crate::error::ConfigError;
use crate::renderer::instance::hex_to_rgb;
use crate::systems::snow::SnowConfig;

/// Session configuration. Every field has a default, so `{}` is a valid
/// config and the host only sends what it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Tree layers, bottom to top.
    pub tree: TreeShape,
    pub memory_band: MemoryBand,
    pub snow: SnowConfig,
    /// Colours new gift boxes are drawn from.
    pub gift_palette: Vec<String>,
    /// World-space height of the tree group's origin.
    pub tree_offset_y: f32,
    pub ambient: f32,
    /// Fixed simulation step in seconds (default: 1/60).
    pub fixed_dt: f32,
    pub max_instances: usize,
    pub max_lights: usize,
    pub backend: BackendConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            tree: TreeShape::reference(),
            memory_band: MemoryBand::default(),
            snow: SnowConfig::default(),
            gift_palette: ["#d32f2f", "#1976d2", "#388e3c", "#fbc02d", "#7b1fa2"]
                .into_iter()
                .map(String::from)
                .collect(),
            tree_offset_y: -2.0,
            ambient: 0.5,
            fixed_dt: 1.0 / 60.0,
            max_instances: 256,
            max_lights: 32,
            backend: BackendConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Parse and validate a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(layer) = self
            .tree
            .layers()
            .iter()
            .find(|l| !positive(l.height) || !positive(l.radius))
        {
            return Err(ConfigError::Invalid(format!(
                "tree layer at {} needs positive radius and height",
                layer.center_height
            )));
        }
        if self.memory_band.min_height > self.memory_band.max_height {
            return Err(ConfigError::Invalid("memory band is inverted".into()));
        }
        if self.gift_palette.is_empty() {
            return Err(ConfigError::Invalid("gift palette is empty".into()));
        }
        if let Some(bad) = self.gift_palette.iter().find(|c| hex_to_rgb(c).is_none()) {
            return Err(ConfigError::Invalid(format!("bad palette colour {bad:?}")));
        }
        if !positive(f64::from(self.fixed_dt)) {
            return Err(ConfigError::Invalid("fixed_dt must be positive".into()));
        }
        // Trunk, layers and star always fit.
        if self.max_instances < self.tree.layers().len() + 2 {
            return Err(ConfigError::Invalid("max_instances too small for the tree".into()));
        }
        if self.max_lights < 2 {
            return Err(ConfigError::Invalid("max_lights must hold the key and star lights".into()));
        }
        Ok(())
    }
}

/// False for zero, negatives and NaN.
fn positive(v: f64) -> bool {
    v > 0.0
}
