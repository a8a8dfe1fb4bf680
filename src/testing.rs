//! In-memory stand-ins for the OS, the store and the process launcher.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use global_hotkey::hotkey::Modifiers;
use hotlaunch_store::{HotkeyStore, StoreError};

use crate::backend::{BindingId, HotkeyBackend, WindowHandle};
use crate::keymap::ChordExt;
use crate::launch::{LaunchError, Launcher};
use crate::{Chord, HotkeyEntry, VirtualKey};

#[derive(Default)]
struct BackendState {
    live: Vec<(BindingId, Modifiers, VirtualKey)>,
    /// Chords held by other processes.
    occupied: Vec<(Modifiers, VirtualKey)>,
    refuse_unregister: bool,
    register_calls: usize,
    unregister_calls: usize,
}

/// Emulates the OS hotkey namespace: a chord can be registered once.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Rc<RefCell<BackendState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> Rc<dyn HotkeyBackend> {
        Rc::new(self.clone())
    }

    /// Marks `chord` as held by another process.
    pub fn occupy(&self, chord: Chord) {
        let (mask, key) = chord.to_os().unwrap();
        self.state.borrow_mut().occupied.push((mask, key));
    }

    pub fn refuse_unregister(&self, refuse: bool) {
        self.state.borrow_mut().refuse_unregister = refuse;
    }

    pub fn live(&self) -> Vec<(BindingId, Chord)> {
        self.state
            .borrow()
            .live
            .iter()
            .map(|&(id, mask, key)| (id, Chord::from_os(mask, key)))
            .collect()
    }

    pub fn live_id(&self, chord: &Chord) -> Option<BindingId> {
        self.live()
            .into_iter()
            .find(|(_, c)| c == chord)
            .map(|(id, _)| id)
    }

    pub fn register_calls(&self) -> usize {
        self.state.borrow().register_calls
    }

    pub fn unregister_calls(&self) -> usize {
        self.state.borrow().unregister_calls
    }
}

impl HotkeyBackend for FakeBackend {
    fn register(
        &self,
        _window: WindowHandle,
        id: BindingId,
        modifiers: Modifiers,
        key: VirtualKey,
    ) -> bool {
        let mut state = self.state.borrow_mut();
        state.register_calls += 1;
        let taken = state
            .live
            .iter()
            .any(|&(live_id, m, k)| live_id == id || (m, k) == (modifiers, key))
            || state.occupied.contains(&(modifiers, key));
        if taken {
            return false;
        }
        state.live.push((id, modifiers, key));
        true
    }

    fn unregister(&self, _window: WindowHandle, id: BindingId) -> bool {
        let mut state = self.state.borrow_mut();
        state.unregister_calls += 1;
        if state.refuse_unregister {
            return false;
        }
        let before = state.live.len();
        state.live.retain(|&(live_id, _, _)| live_id != id);
        state.live.len() != before
    }
}

#[derive(Default)]
struct StoreState {
    entries: Vec<HotkeyEntry>,
    fail_writes: bool,
    fail_reads: bool,
}

/// Store keeping entries in memory.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<HotkeyEntry>) -> Self {
        let store = Self::new();
        store.state.borrow_mut().entries = entries;
        store
    }

    pub fn boxed(&self) -> Box<dyn HotkeyStore> {
        Box::new(self.clone())
    }

    pub fn entries(&self) -> Vec<HotkeyEntry> {
        self.state.borrow().entries.clone()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.borrow_mut().fail_reads = fail;
    }

    fn check_write(&self) -> hotlaunch_store::Result<()> {
        if self.state.borrow().fail_writes {
            return Err(StoreError::Write {
                path: PathBuf::from("memory"),
                source: std::io::Error::other("disk full"),
            });
        }
        Ok(())
    }
}

impl HotkeyStore for MemoryStore {
    fn load_all(&mut self) -> hotlaunch_store::Result<Vec<HotkeyEntry>> {
        if self.state.borrow().fail_reads {
            return Err(StoreError::Malformed {
                path: PathBuf::from("memory"),
                message: "unexpected end of file".to_owned(),
            });
        }
        Ok(self.entries())
    }

    fn save(&mut self, entry: &HotkeyEntry) -> hotlaunch_store::Result<()> {
        self.check_write()?;
        let mut state = self.state.borrow_mut();
        match state.entries.iter_mut().find(|e| e.id() == entry.id()) {
            Some(existing) => *existing = entry.clone(),
            None => state.entries.push(entry.clone()),
        }
        Ok(())
    }

    fn delete(&mut self, id: &str) -> hotlaunch_store::Result<()> {
        self.check_write()?;
        self.state.borrow_mut().entries.retain(|e| e.id() != id);
        Ok(())
    }

    fn save_all(&mut self, entries: &[HotkeyEntry]) -> hotlaunch_store::Result<()> {
        self.check_write()?;
        self.state.borrow_mut().entries = entries.to_vec();
        Ok(())
    }
}

#[derive(Default)]
struct LauncherState {
    launched: Vec<PathBuf>,
    fail: bool,
}

/// Launcher that records paths instead of starting processes.
#[derive(Clone, Default)]
pub struct RecordingLauncher {
    state: Rc<RefCell<LauncherState>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed(&self) -> Box<dyn Launcher> {
        Box::new(self.clone())
    }

    pub fn launched(&self) -> Vec<PathBuf> {
        self.state.borrow().launched.clone()
    }

    pub fn fail(&self, fail: bool) {
        self.state.borrow_mut().fail = fail;
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, path: &Path) -> Result<(), LaunchError> {
        let mut state = self.state.borrow_mut();
        if state.fail {
            return Err(LaunchError::Spawn {
                path: path.to_owned(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        state.launched.push(path.to_owned());
        Ok(())
    }
}
