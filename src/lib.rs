// Re-export from sub-crates
pub use hotlaunch_core::{
    APP_NAME, APP_NAME_PRETTY, Chord, ChordError, Config, ConfigManager, DEFAULT_LOG_LEVEL,
    HotkeyEntry, KeyClass, Modifier, STORE_FILE_NAME, VirtualKey,
};
pub use hotlaunch_store::{HotkeyStore, StoreError, XmlStore};
use thiserror::Error;

// App-specific modules
pub mod backend;
pub mod binding;
pub mod event;
pub mod icon;
pub mod keymap;
pub mod launch;
pub mod notify;
pub mod recorder;
pub mod registry;

#[cfg(test)]
mod testing;

pub use backend::{BindingId, GlobalHotKeyBackend, HotkeyBackend, WindowHandle};
pub use binding::HotkeyBinding;
pub use keymap::ChordExt;
pub use launch::{LaunchError, Launcher, ProcessLauncher};
pub use recorder::KeystrokeRecorder;
pub use registry::{BindingStatus, FireOutcome, HotkeyRegistry};

// Version from this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors returned by hotkey registration and the registry.
#[derive(Debug, Error)]
pub enum HotkeyError {
    /// The chord is already bound, by this process or another one.
    #[error("{chord} is already in use")]
    RegistrationConflict { chord: Chord },

    /// The chord cannot be registered with the OS.
    #[error("chord \"{chord}\" cannot be registered: {reason}")]
    InvalidChord { chord: Chord, reason: &'static str },

    /// The OS refused to drop the chord's current registration.
    #[error("{chord} could not be released")]
    ReleaseRefused { chord: Chord },

    /// The store could not be read or written. In-memory state is kept.
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// Result type for hotkey operations.
pub type Result<T> = std::result::Result<T, HotkeyError>;
