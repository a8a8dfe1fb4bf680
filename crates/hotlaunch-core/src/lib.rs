//! Core types and configuration for hotlaunch.
//!
//! This crate provides the platform-agnostic chord model, the hotkey entry
//! record and configuration handling shared by the other hotlaunch crates.

mod chord;
mod config;
mod entry;
mod key;

pub use chord::Chord;
pub use config::{Config, ConfigManager};
pub use entry::HotkeyEntry;
pub use key::{KeyClass, Modifier, VirtualKey};
use thiserror::Error;

/// Application name
pub const APP_NAME: &str = "hotlaunch";

/// Pretty application name for display
pub const APP_NAME_PRETTY: &str = "HotLaunch";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// File name of the hotkey store inside the data directory
pub const STORE_FILE_NAME: &str = "hotkeys.xml";

/// Errors produced while building or parsing a [`Chord`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChordError {
    #[error("unknown modifier code {0}")]
    UnknownModifierCode(u32),

    #[error("invalid key code {0}")]
    InvalidKeyCode(u32),

    #[error("unknown key name {0:?}")]
    UnknownKeyName(String),
}
