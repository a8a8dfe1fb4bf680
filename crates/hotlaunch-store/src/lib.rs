//! Persistent storage for hotlaunch hotkeys.
//!
//! This crate defines the [`HotkeyStore`] trait the registry persists through
//! and [`XmlStore`], the on-disk implementation.

mod xml;

use std::io;
use std::path::PathBuf;

use hotlaunch_core::HotkeyEntry;
use thiserror::Error;
pub use xml::XmlStore;

/// Errors that can occur while reading or writing the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read hotkey store at {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("hotkey store at {path:?} is malformed: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("failed to write hotkey store at {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize hotkey store: {0}")]
    Serialize(String),
}

impl StoreError {
    /// Whether the store could not be read or parsed.
    pub fn is_read(&self) -> bool {
        matches!(self, StoreError::Read { .. } | StoreError::Malformed { .. })
    }

    /// Whether a change could not be written.
    pub fn is_write(&self) -> bool {
        matches!(self, StoreError::Write { .. } | StoreError::Serialize(_))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Durable storage of hotkey entries keyed by id.
pub trait HotkeyStore {
    /// Reads every well-formed entry. Malformed entries are skipped; a
    /// document that cannot be parsed at all is an error.
    fn load_all(&mut self) -> Result<Vec<HotkeyEntry>>;

    /// Inserts or replaces the entry with the same id.
    fn save(&mut self, entry: &HotkeyEntry) -> Result<()>;

    /// Deletes the entry with this id. Unknown ids are ignored.
    fn delete(&mut self, id: &str) -> Result<()>;

    /// Replaces the whole store with `entries`.
    fn save_all(&mut self, entries: &[HotkeyEntry]) -> Result<()>;
}
