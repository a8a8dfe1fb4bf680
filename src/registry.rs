//! The set of configured hotkeys and their live OS registrations.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use hotlaunch_store::HotkeyStore;
use tracing::{debug, error, info, warn};

use crate::backend::{BindingId, HotkeyBackend, WindowHandle};
use crate::binding::HotkeyBinding;
use crate::launch::{LaunchError, Launcher};
use crate::{Chord, HotkeyEntry, HotkeyError, Result};

/// Whether an entry currently has a live OS registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingStatus {
    Registered,
    /// The entry has no chord or no program yet.
    Incomplete,
    /// The entry is complete but not registered, with the reason.
    Unregistered(String),
}

impl fmt::Display for BindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingStatus::Registered => f.write_str("registered"),
            BindingStatus::Incomplete => f.write_str("incomplete"),
            BindingStatus::Unregistered(reason) => write!(f, "not registered: {reason}"),
        }
    }
}

/// Result of dispatching a fire notification.
#[derive(Debug)]
pub enum FireOutcome {
    /// No live binding has this id.
    Ignored,
    Launched(PathBuf),
    Failed(LaunchError),
}

/// Owns every hotkey entry and the binding that backs it.
///
/// All mutation happens on the event loop thread. Entries are persisted
/// through the store on every change; when a write fails the in-memory
/// change is kept and the error is returned.
pub struct HotkeyRegistry {
    backend: Rc<dyn HotkeyBackend>,
    store: Box<dyn HotkeyStore>,
    launcher: Box<dyn Launcher>,
    window: WindowHandle,
    entries: HashMap<String, HotkeyEntry>,
    /// Entry ids in insertion order.
    order: Vec<String>,
    bindings: HashMap<String, HotkeyBinding>,
    /// Removed bindings the OS refused to release. Retried on every change.
    stuck: Vec<HotkeyBinding>,
    /// Why complete entries without a binding failed to register.
    failures: HashMap<String, String>,
}

impl HotkeyRegistry {
    pub fn new(
        backend: Rc<dyn HotkeyBackend>,
        store: Box<dyn HotkeyStore>,
        launcher: Box<dyn Launcher>,
        window: WindowHandle,
    ) -> Self {
        Self {
            backend,
            store,
            launcher,
            window,
            entries: HashMap::new(),
            order: Vec::new(),
            bindings: HashMap::new(),
            stuck: Vec::new(),
            failures: HashMap::new(),
        }
    }

    /// Replaces the registry contents with the stored entries and registers
    /// every complete one.
    ///
    /// Entries that fail to register are kept and reported through their
    /// status. Only an unreadable store is an error, in which case the
    /// current contents are left untouched.
    pub fn load_all(&mut self) -> Result<()> {
        let stored = self.store.load_all()?;

        self.dispose();
        self.entries.clear();
        self.order.clear();
        self.failures.clear();

        for entry in stored {
            let id = entry.id().to_owned();
            if self.entries.contains_key(&id) {
                warn!(entry_id = %id, "skipping duplicate hotkey entry");
                continue;
            }
            if entry.is_complete() {
                if let Err(e) = self.bind(&entry) {
                    warn!(
                        entry_id = %id,
                        chord = %entry.chord,
                        error = %e,
                        "could not register stored hotkey"
                    );
                    self.failures.insert(id.clone(), e.to_string());
                }
            }
            self.order.push(id.clone());
            self.entries.insert(id, entry);
        }

        info!(
            entries = self.entries.len(),
            registered = self.bindings.len(),
            "hotkeys loaded"
        );
        Ok(())
    }

    /// Creates or updates an entry and returns its id.
    ///
    /// Without an id, or with an empty one, a fresh id is generated. A new
    /// entry whose chord is already in use is not added. Otherwise the entry
    /// is kept and persisted; if its chord cannot be registered it is left
    /// without a live binding and the error is returned.
    ///
    /// Updating an entry whose current registration the OS refuses to
    /// release fails with `ReleaseRefused` and leaves the entry unchanged.
    pub fn add(
        &mut self,
        id: Option<&str>,
        chord: Chord,
        target_path: impl Into<PathBuf>,
    ) -> Result<String> {
        self.retry_stuck();
        let id = id
            .filter(|id| !id.is_empty())
            .map_or_else(HotkeyEntry::generate_id, str::to_owned);
        let entry = HotkeyEntry::new(id, chord, target_path);
        if self.entries.contains_key(entry.id()) {
            self.rebind(entry)
        } else {
            self.insert(entry)
        }
    }

    fn insert(&mut self, entry: HotkeyEntry) -> Result<String> {
        let id = entry.id().to_owned();
        let bound = if entry.is_complete() {
            match self.bind(&entry) {
                Err(e @ HotkeyError::RegistrationConflict { .. }) => return Err(e),
                bound => bound,
            }
        } else {
            Ok(())
        };
        match &bound {
            Ok(()) => info!(
                entry_id = %id,
                chord = %entry.chord,
                path = %entry.target_path.display(),
                "hotkey added"
            ),
            Err(e) => {
                warn!(entry_id = %id, chord = %entry.chord, error = %e, "hotkey added but not registered");
                self.failures.insert(id.clone(), e.to_string());
            }
        }

        self.order.push(id.clone());
        self.entries.insert(id.clone(), entry);
        let saved = self.persist(&id);
        bound?;
        saved?;
        Ok(id)
    }

    fn rebind(&mut self, entry: HotkeyEntry) -> Result<String> {
        let id = entry.id().to_owned();
        if let Some(old) = self.bindings.get_mut(&id) {
            if !old.release() {
                warn!(entry_id = %id, chord = %old.chord(), "hotkey kept, old chord could not be released");
                return Err(HotkeyError::ReleaseRefused {
                    chord: old.chord().clone(),
                });
            }
            self.bindings.remove(&id);
        }
        self.failures.remove(&id);

        let bound = if entry.is_complete() {
            self.bind(&entry)
        } else {
            Ok(())
        };
        match &bound {
            Ok(()) => info!(entry_id = %id, chord = %entry.chord, "hotkey updated"),
            Err(e) => {
                warn!(entry_id = %id, chord = %entry.chord, error = %e, "hotkey updated but not registered");
                self.failures.insert(id.clone(), e.to_string());
            }
        }

        self.entries.insert(id.clone(), entry);
        let saved = self.persist(&id);
        bound?;
        saved?;
        Ok(id)
    }

    /// Registers `entry`, refusing chords another entry already holds.
    fn bind(&mut self, entry: &HotkeyEntry) -> Result<()> {
        if let Some(other) = self.holder_of(&entry.chord) {
            debug!(entry_id = %entry.id(), other = %other, chord = %entry.chord, "chord held by another entry");
            return Err(HotkeyError::RegistrationConflict {
                chord: entry.chord.clone(),
            });
        }
        let binding = HotkeyBinding::create(
            entry.id(),
            entry.chord.clone(),
            self.window,
            self.backend.clone(),
        )?;
        self.bindings.insert(entry.id().to_owned(), binding);
        Ok(())
    }

    fn holder_of(&self, chord: &Chord) -> Option<&str> {
        self.bindings
            .values()
            .chain(&self.stuck)
            .find(|b| b.is_registered() && b.chord() == chord)
            .map(HotkeyBinding::entry_id)
    }

    /// Retries releasing bindings the OS refused to drop earlier.
    fn retry_stuck(&mut self) {
        if self.stuck.is_empty() {
            return;
        }
        self.stuck.retain_mut(|binding| !binding.release());
        if !self.stuck.is_empty() {
            warn!(count = self.stuck.len(), "hotkeys still waiting to be released");
        }
    }

    fn persist(&mut self, id: &str) -> Result<()> {
        let Some(entry) = self.entries.get(id) else {
            return Ok(());
        };
        self.store.save(entry).map_err(|e| {
            error!(entry_id = %id, error = %e, "failed to save hotkey");
            HotkeyError::from(e)
        })
    }

    /// Unregisters and deletes an entry. Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        self.retry_stuck();
        if self.entries.remove(id).is_none() {
            debug!(entry_id = %id, "remove of unknown hotkey ignored");
            return Ok(());
        }
        self.order.retain(|e| e != id);
        self.failures.remove(id);
        if let Some(mut binding) = self.bindings.remove(id) {
            if !binding.release() {
                self.stuck.push(binding);
            }
        }
        info!(entry_id = %id, "hotkey removed");

        self.store.delete(id).map_err(|e| {
            error!(entry_id = %id, error = %e, "failed to delete hotkey");
            HotkeyError::from(e)
        })
    }

    /// Releases every live binding. Entries stay in memory. Bindings the OS
    /// refuses to release are retried by the next change or dispose.
    pub fn dispose(&mut self) {
        let count = self.bindings.len();
        self.stuck.extend(self.bindings.drain().map(|(_, binding)| binding));
        self.retry_stuck();
        if count > 0 {
            debug!(count, "hotkey bindings released");
        }
    }

    /// Launches the program of the entry a fire notification belongs to.
    ///
    /// The path is looked up when the hotkey fires, so a rebind takes effect
    /// immediately. Notifications for released bindings are ignored.
    pub fn handle_fired(&self, binding_id: BindingId) -> FireOutcome {
        let Some(entry) = self
            .bindings
            .values()
            .find_map(|b| b.handle_message(binding_id))
            .and_then(|entry_id| self.entries.get(entry_id))
        else {
            debug!(binding_id = %binding_id, "ignoring fire for unknown binding");
            return FireOutcome::Ignored;
        };

        let path = entry.target_path();
        debug!(entry_id = %entry.id(), binding_id = %binding_id, "hotkey fired");
        match self.launcher.launch(path) {
            Ok(()) => FireOutcome::Launched(path.to_owned()),
            Err(e) => {
                error!(entry_id = %entry.id(), path = %path.display(), "{e}");
                FireOutcome::Failed(e)
            }
        }
    }

    /// Entries in the order they were added or loaded.
    pub fn entries(&self) -> impl Iterator<Item = &HotkeyEntry> + '_ {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn get(&self, id: &str) -> Option<&HotkeyEntry> {
        self.entries.get(id)
    }

    pub fn status(&self, id: &str) -> Option<BindingStatus> {
        let entry = self.entries.get(id)?;
        let status = match self.bindings.get(id) {
            Some(binding) if binding.is_registered() => BindingStatus::Registered,
            _ if !entry.is_complete() => BindingStatus::Incomplete,
            _ => BindingStatus::Unregistered(
                self.failures
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| "released".to_owned()),
            ),
        };
        Some(status)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Drop for HotkeyRegistry {
    fn drop(&mut self) {
        self.dispose();
    }
}
