//! Logical hotkey records.

use std::path::{Path, PathBuf};

use crate::Chord;

/// A persisted hotkey: a stable id, the chord that triggers it and the
/// program it launches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyEntry {
    id: String,
    pub chord: Chord,
    pub target_path: PathBuf,
}

impl HotkeyEntry {
    pub fn new(id: impl Into<String>, chord: Chord, target_path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            chord,
            target_path: target_path.into(),
        }
    }

    /// Generates a fresh entry id. Ids are random and never derived from the
    /// chord, so a chord can be rebound without changing identity.
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Whether both the chord and the target path are set.
    pub fn is_complete(&self) -> bool {
        !self.chord.is_empty() && !self.target_path.as_os_str().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VirtualKey;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = HotkeyEntry::generate_id();
        let b = HotkeyEntry::generate_id();
        assert_ne!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_is_complete() {
        let chord = Chord::from_keys([VirtualKey::LEFT_CONTROL, VirtualKey::SPACE]);
        assert!(HotkeyEntry::new("a", chord.clone(), "notepad.exe").is_complete());
        assert!(!HotkeyEntry::new("a", chord, "").is_complete());
        assert!(!HotkeyEntry::new("a", Chord::default(), "notepad.exe").is_complete());
    }
}
