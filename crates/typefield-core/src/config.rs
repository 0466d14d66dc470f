//! Tunable constants for the canvas engine.
//!
//! Every field has a serde default so partial JSON configs are accepted.

use serde::{Deserialize, Serialize};

fn default_zoom_ladder() -> Vec<f64> {
    vec![0.25, 0.33, 0.5, 0.67, 0.75, 1.0, 1.25, 1.5, 2.0, 3.0, 4.0]
}

fn default_display_sizes() -> Vec<f64> {
    vec![10.0, 12.0, 14.0, 16.0, 18.0, 20.0, 24.0, 28.0, 32.0, 40.0, 48.0, 64.0]
}

fn default_logical_sizes() -> Vec<f64> {
    vec![
        8.0, 10.0, 12.0, 14.0, 16.0, 18.0, 20.0, 24.0, 28.0, 32.0, 40.0, 48.0, 64.0, 96.0,
    ]
}

fn default_min_scale() -> f64 {
    crate::camera::MIN_SCALE
}

fn default_max_scale() -> f64 {
    crate::camera::MAX_SCALE
}

fn default_font_size() -> f64 {
    16.0
}

fn default_grid_unit() -> f64 {
    20.0
}

fn default_hit_tolerance() -> f64 {
    5.0
}

fn default_link_padding() -> f64 {
    6.0
}

fn default_overlap_offset() -> f64 {
    12.0
}

fn default_history_depth() -> usize {
    100
}

fn default_autosave_debounce_ms() -> u64 {
    1500
}

fn default_resize_settle_ms() -> u64 {
    150
}

fn default_guide_size() -> (f64, f64) {
    (320.0, 180.0)
}

/// Placement of the primary text-entry box, relative to the viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBoxLayout {
    /// Horizontal position of the box's left edge as a fraction of viewport width.
    pub left_ratio: f64,
    /// Vertical position of the box's top edge as a fraction of viewport height.
    pub top_ratio: f64,
    /// Box width as a fraction of viewport width.
    pub width_ratio: f64,
}

impl Default for TextBoxLayout {
    fn default() -> Self {
        Self {
            left_ratio: 0.1,
            top_ratio: 0.4,
            width_ratio: 0.6,
        }
    }
}

/// Configuration for the canvas engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Discrete scales visited by zoom in/out steps.
    #[serde(default = "default_zoom_ladder")]
    pub zoom_ladder: Vec<f64>,
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
    /// On-screen font sizes (pixels) visited by display size steps.
    #[serde(default = "default_display_sizes")]
    pub display_sizes: Vec<f64>,
    /// World font sizes visited by logical size steps.
    #[serde(default = "default_logical_sizes")]
    pub logical_sizes: Vec<f64>,
    #[serde(default = "default_font_size")]
    pub default_display_size: f64,
    #[serde(default = "default_font_size")]
    pub default_logical_size: f64,
    /// Grid spacing in screen pixels; the world grid is `grid_unit / scale`.
    #[serde(default = "default_grid_unit")]
    pub grid_unit: f64,
    /// Hit tolerance in screen pixels.
    #[serde(default = "default_hit_tolerance")]
    pub hit_tolerance: f64,
    /// Outward push applied to link anchor points (world units).
    #[serde(default = "default_link_padding")]
    pub link_padding: f64,
    /// Vertical offset between centers for links whose boxes overlap.
    #[serde(default = "default_overlap_offset")]
    pub overlap_offset: f64,
    #[serde(default)]
    pub text_box: TextBoxLayout,
    /// Maximum number of undo snapshots kept.
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
    #[serde(default = "default_autosave_debounce_ms")]
    pub autosave_debounce_ms: u64,
    #[serde(default = "default_resize_settle_ms")]
    pub resize_settle_ms: u64,
    /// Default guide size (world units) for "add guide".
    #[serde(default = "default_guide_size")]
    pub guide_size: (f64, f64),
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            zoom_ladder: default_zoom_ladder(),
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            display_sizes: default_display_sizes(),
            logical_sizes: default_logical_sizes(),
            default_display_size: default_font_size(),
            default_logical_size: default_font_size(),
            grid_unit: default_grid_unit(),
            hit_tolerance: default_hit_tolerance(),
            link_padding: default_link_padding(),
            overlap_offset: default_overlap_offset(),
            text_box: TextBoxLayout::default(),
            history_depth: default_history_depth(),
            autosave_debounce_ms: default_autosave_debounce_ms(),
            resize_settle_ms: default_resize_settle_ms(),
            guide_size: default_guide_size(),
        }
    }
}

impl CanvasConfig {
    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
