//! Typefield Core Library
//!
//! Platform-agnostic document model, camera, hit-testing, link geometry,
//! modes and persistence for the Typefield infinite canvas.

pub mod assistant;
pub mod bounds;
pub mod camera;
pub mod canvas;
pub mod config;
pub mod document;
pub mod editor;
pub mod history;
pub mod hit;
pub mod input;
pub mod links;
pub mod measure;
pub mod modes;
pub mod objects;
pub mod selection;
pub mod snap;
pub mod storage;
pub mod timer;
pub mod viewport;

pub use assistant::{AssistantClient, AssistantError, AssistantStatus, CannedAssistant, PendingQuery};
pub use camera::{Camera, screen_to_world, world_to_screen};
pub use canvas::{Canvas, Toggles};
pub use config::{CanvasConfig, TextBoxLayout};
pub use document::CanvasDocument;
pub use editor::{Editor, QueryResolution};
pub use hit::{Hit, HitZone, locate};
pub use input::{Key, KeyEvent, Modifiers, PointerEvent, WheelEvent};
pub use links::{LinkEndpoints, LinkGeometry, calculate_link_endpoints};
pub use measure::{ApproxMeasure, GlyphMeasure};
pub use modes::{LinkState, Mode};
pub use objects::{CanvasObject, GuideObject, LinkObject, LinkStyle, ObjectId, TextObject};
pub use snap::{SnapResult, snap_to_grid};
pub use storage::{SessionSnapshot, Storage, StorageError};
pub use timer::DebounceTimer;
pub use viewport::Viewport;
