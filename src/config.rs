use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Layout constants, all in the same linear unit (CSS pixels in practice).
/// Passed by reference into every layout call; never global.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub box_width: f32,
    pub box_height: f32,
    /// Horizontal gap between adjacent columns.
    pub column_gap: f32,
    /// Minimum vertical gap between stacked boxes; also the collision
    /// sweep's floor.
    pub row_gap: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    /// Padding between a group's bounding box and its member boxes.
    pub group_padding: f32,
    /// Extra space above the members reserved for the group label.
    pub group_label_band: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            box_width: 172.0,
            box_height: 64.0,
            column_gap: 96.0,
            row_gap: 28.0,
            margin_x: 48.0,
            margin_y: 48.0,
            group_padding: 14.0,
            group_label_band: 26.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Fallback raster size when the SVG carries no usable dimensions.
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

/// Load a JSON5 config file merged over defaults. `None` yields defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = std::fs::read_to_string(path)?;
    let config: Config = json5::from_str(&text)?;
    Ok(config)
}
