//! XML hotkey store.
//!
//! ```xml
//! <root>
//!   <hotkeys>
//!     <hotkey id="..." file_path="C:\Windows\notepad.exe">
//!       <command_keys>
//!         <command_key>2</command_key>
//!       </command_keys>
//!       <keys>
//!         <key>75</key>
//!       </keys>
//!     </hotkey>
//!   </hotkeys>
//! </root>
//! ```
//!
//! Modifier and key codes are the native integer values. Every write
//! rewrites the whole document through a temporary file that is renamed
//! over the store, so a crash never leaves a half-written file behind.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use hotlaunch_core::{Chord, HotkeyEntry};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::{HotkeyStore, Result, StoreError};

const ROOT_TAG: &str = "root";
const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    hotkeys: HotkeyList,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HotkeyList {
    #[serde(rename = "hotkey", default)]
    entries: Vec<HotkeyNode>,
}

/// A `<hotkey>` element as written on disk. Everything is kept as text so a
/// malformed entry survives rewrites of the rest of the document untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HotkeyNode {
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(rename = "@file_path", default, skip_serializing_if = "Option::is_none")]
    file_path: Option<String>,
    #[serde(default)]
    command_keys: CommandKeys,
    #[serde(default)]
    keys: Keys,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CommandKeys {
    #[serde(rename = "command_key", default)]
    codes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Keys {
    #[serde(rename = "key", default)]
    codes: Vec<String>,
}

impl From<&HotkeyEntry> for HotkeyNode {
    fn from(entry: &HotkeyEntry) -> Self {
        let to_text =
            |codes: Vec<u32>| -> Vec<String> { codes.iter().map(u32::to_string).collect() };
        Self {
            id: Some(entry.id().to_owned()),
            file_path: Some(entry.target_path().to_string_lossy().into_owned()),
            command_keys: CommandKeys {
                codes: to_text(entry.chord.modifier_codes()),
            },
            keys: Keys {
                codes: to_text(entry.chord.key_codes()),
            },
        }
    }
}

impl HotkeyNode {
    fn has_id(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }

    fn to_entry(&self) -> std::result::Result<HotkeyEntry, String> {
        let id = self
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or("missing id attribute")?;
        let file_path = self
            .file_path
            .as_deref()
            .ok_or("missing file_path attribute")?;

        let parse = |codes: &[String]| {
            codes
                .iter()
                .map(|c| {
                    c.trim()
                        .parse::<u32>()
                        .map_err(|_| format!("unparseable code {c:?}"))
                })
                .collect::<std::result::Result<Vec<_>, _>>()
        };
        let modifiers = parse(&self.command_keys.codes)?;
        let keys = parse(&self.keys.codes)?;
        let chord = Chord::from_codes(&modifiers, &keys).map_err(|e| e.to_string())?;

        Ok(HotkeyEntry::new(id, chord, file_path))
    }
}

/// Hotkey store backed by an XML file.
#[derive(Debug)]
pub struct XmlStore {
    path: PathBuf,
}

impl XmlStore {
    /// Opens the store at `path`, creating an empty document if the file
    /// does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { path: path.into() };
        if !store.path.exists() {
            info!(path = ?store.path, "creating empty hotkey store");
            store.write(&Document::default())?;
        }
        Ok(store)
    }

    /// Returns the path to the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Document> {
        let content = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        quick_xml::de::from_str(&content).map_err(|e| StoreError::Malformed {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn write(&self, document: &Document) -> Result<()> {
        let mut xml = String::from(XML_DECLARATION);
        let mut serializer = quick_xml::se::Serializer::with_root(&mut xml, Some(ROOT_TAG))
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        serializer.indent(' ', 2);
        document
            .serialize(serializer)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        xml.push('\n');

        let write_error = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_error)?;

        let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
        file.write_all(xml.as_bytes()).map_err(write_error)?;
        file.persist(&self.path).map_err(|e| write_error(e.error))?;

        debug!(
            path = ?self.path,
            entries = document.hotkeys.entries.len(),
            "hotkey store written"
        );
        Ok(())
    }
}

impl HotkeyStore for XmlStore {
    fn load_all(&mut self) -> Result<Vec<HotkeyEntry>> {
        let document = self.read()?;
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(document.hotkeys.entries.len());

        for (index, node) in document.hotkeys.entries.iter().enumerate() {
            match node.to_entry() {
                Ok(entry) if !seen.insert(entry.id().to_owned()) => {
                    warn!(index, entry_id = entry.id(), "skipping duplicate hotkey entry");
                }
                Ok(entry) => entries.push(entry),
                Err(reason) => {
                    warn!(index, id = ?node.id, %reason, "skipping malformed hotkey entry");
                }
            }
        }

        info!(path = ?self.path, count = entries.len(), "hotkeys loaded");
        Ok(entries)
    }

    fn save(&mut self, entry: &HotkeyEntry) -> Result<()> {
        let mut document = self.read()?;
        let node = HotkeyNode::from(entry);
        let nodes = &mut document.hotkeys.entries;
        match nodes.iter_mut().find(|n| n.has_id(entry.id())) {
            Some(existing) => *existing = node,
            None => nodes.push(node),
        }
        self.write(&document)
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        let mut document = self.read()?;
        let before = document.hotkeys.entries.len();
        document.hotkeys.entries.retain(|n| !n.has_id(id));
        if document.hotkeys.entries.len() == before {
            debug!(entry_id = id, "delete of unknown hotkey ignored");
            return Ok(());
        }
        self.write(&document)
    }

    fn save_all(&mut self, entries: &[HotkeyEntry]) -> Result<()> {
        let document = Document {
            hotkeys: HotkeyList {
                entries: entries.iter().map(HotkeyNode::from).collect(),
            },
        };
        self.write(&document)
    }
}
