//! Serialized editor session.

use super::{StorageError, StorageResult};
use crate::canvas::Toggles;
use crate::modes::Mode;
use crate::objects::CanvasObject;
use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// Current session format version.
pub const SESSION_FORMAT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SESSION_FORMAT_VERSION
}

fn default_scale() -> f64 {
    1.0
}

fn default_font_size() -> f64 {
    16.0
}

fn default_width_ratio() -> f64 {
    crate::config::TextBoxLayout::default().width_ratio
}

/// Everything needed to reconstruct the viewport, the objects and the UI
/// toggles. Objects are listed back to front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub objects: Vec<CanvasObject>,
    #[serde(default)]
    pub offset: Vec2,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub typing_text: String,
    #[serde(default = "default_font_size")]
    pub display_size: f64,
    #[serde(default = "default_font_size")]
    pub logical_size: f64,
    /// Text box width as a fraction of the viewport width.
    #[serde(default = "default_width_ratio")]
    pub text_box_width: f64,
    #[serde(default)]
    pub toggles: Toggles,
    #[serde(default)]
    pub mode: Mode,
}

impl SessionSnapshot {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse and check the format version.
    pub fn parse(json: &str) -> StorageResult<Self> {
        let session =
            Self::from_json(json).map_err(|e| StorageError::Serialization(e.to_string()))?;
        session.check_version()?;
        Ok(session)
    }

    pub fn check_version(&self) -> StorageResult<()> {
        if self.version > SESSION_FORMAT_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: self.version,
                supported: SESSION_FORMAT_VERSION,
            });
        }
        Ok(())
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            version: SESSION_FORMAT_VERSION,
            objects: Vec::new(),
            offset: Vec2::ZERO,
            scale: default_scale(),
            typing_text: String::new(),
            display_size: default_font_size(),
            logical_size: default_font_size(),
            text_box_width: default_width_ratio(),
            toggles: Toggles::default(),
            mode: Mode::default(),
        }
    }
}
