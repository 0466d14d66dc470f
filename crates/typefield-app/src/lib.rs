//! Typefield application library.
//!
//! Wires the editor core to storage, the frame scheduler and an assistant
//! client, and replays scripted input sessions.

mod app;
mod config;
mod error;
pub mod script;
mod shortcuts;

pub use app::{App, ReplaySummary};
pub use config::AppConfig;
pub use error::AppError;
pub use script::{Script, ScriptEvent};
pub use shortcuts::{Shortcut, ShortcutRegistry};
