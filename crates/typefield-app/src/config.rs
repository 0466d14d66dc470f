//! Application configuration.

use crate::error::AppError;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use typefield_core::config::CanvasConfig;
use typefield_core::storage::DEFAULT_SESSION_KEY;
use typefield_render::GridStyle;

fn default_viewport() -> Size {
    Size::new(1280.0, 800.0)
}

fn default_session_key() -> String {
    DEFAULT_SESSION_KEY.to_string()
}

fn default_grid_style() -> String {
    GridStyle::default().name().to_string()
}

fn default_true() -> bool {
    true
}

/// Top-level configuration: the canvas engine settings plus the shell's own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub canvas: CanvasConfig,
    /// Initial viewport size in pixels.
    #[serde(default = "default_viewport")]
    pub viewport: Size,
    /// Session directory; the platform data directory when unset.
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
    #[serde(default = "default_session_key")]
    pub session_key: String,
    /// Grid style name ("None", "Lines", "Crosses", "Dots").
    #[serde(default = "default_grid_style")]
    pub grid_style: String,
    /// Restore the last saved session on startup.
    #[serde(default = "default_true")]
    pub restore_last_session: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            viewport: default_viewport(),
            storage_dir: None,
            session_key: default_session_key(),
            grid_style: default_grid_style(),
            restore_last_session: true,
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The configured grid style.
    pub fn grid(&self) -> GridStyle {
        GridStyle::from_name(&self.grid_style).unwrap_or_default()
    }

    fn validate(&self) -> Result<(), AppError> {
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(AppError::Config(format!(
                "viewport must have a positive size, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if GridStyle::from_name(&self.grid_style).is_none() {
            return Err(AppError::Config(format!(
                "unknown grid style {:?}",
                self.grid_style
            )));
        }
        if self.session_key.trim().is_empty() {
            return Err(AppError::Config("session key must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.grid(), GridStyle::Lines);
    }

    #[test]
    fn test_nested_canvas_overrides() {
        let config = AppConfig::from_json(
            r#"{ "canvas": { "grid_unit": 10.0 }, "grid_style": "dots", "viewport": { "width": 640.0, "height": 480.0 } }"#,
        )
        .unwrap();
        assert!((config.canvas.grid_unit - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.grid(), GridStyle::Dots);
        assert_eq!(config.viewport, Size::new(640.0, 480.0));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            AppConfig::from_json(r#"{ "grid_style": "plaid" }"#),
            Err(AppError::Config(_))
        ));
        assert!(AppConfig::from_json(r#"{ "viewport": { "width": 0.0, "height": 10.0 } }"#).is_err());
        assert!(AppConfig::from_json(r#"{ "session_key": " " }"#).is_err());
    }
}
