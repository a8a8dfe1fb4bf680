//! OS global hotkey registration.
//!
//! [`HotkeyBackend`] is the seam to the operating system's hotkey facility.
//! [`GlobalHotKeyBackend`] implements it on top of the `global-hotkey` crate.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use global_hotkey::hotkey::{HotKey, Modifiers};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use tracing::{debug, warn};

use crate::VirtualKey;
use crate::keymap::physical_key;

/// Numeric id of one live OS registration.
///
/// Ids are issued from a process-wide counter and are unique for the
/// lifetime of this process. They are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u32);

static NEXT_BINDING_ID: AtomicU32 = AtomicU32::new(1);

impl BindingId {
    /// Issues a fresh id.
    pub fn next() -> Self {
        Self(NEXT_BINDING_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Native handle of the window whose message queue receives hotkey
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowHandle(isize);

impl WindowHandle {
    /// No window: messages go to the registering thread's own queue.
    pub const THREAD: Self = Self(0);

    pub fn raw(self) -> isize {
        self.0
    }
}

/// The OS hotkey facility.
///
/// Both calls report success as a boolean, matching the native API. A
/// `false` from `register` means the chord is already taken.
pub trait HotkeyBackend {
    fn register(
        &self,
        window: WindowHandle,
        id: BindingId,
        modifiers: Modifiers,
        key: VirtualKey,
    ) -> bool;

    fn unregister(&self, window: WindowHandle, id: BindingId) -> bool;
}

/// Backend using `global_hotkey::GlobalHotKeyManager`.
///
/// `global-hotkey` identifies hotkeys by their content, so this keeps the
/// mapping from binding ids to registered hotkeys and translates incoming
/// [`GlobalHotKeyEvent`]s back to binding ids. Must live on the thread that
/// runs the event loop.
pub struct GlobalHotKeyBackend {
    manager: GlobalHotKeyManager,
    registered: RefCell<HashMap<BindingId, HotKey>>,
}

impl GlobalHotKeyBackend {
    pub fn new() -> Result<Self, global_hotkey::Error> {
        Ok(Self {
            manager: GlobalHotKeyManager::new()?,
            registered: RefCell::new(HashMap::new()),
        })
    }

    /// The binding a pressed-hotkey event belongs to. Releases and unknown
    /// hotkeys yield `None`.
    pub fn translate(&self, event: &GlobalHotKeyEvent) -> Option<BindingId> {
        if event.state() != HotKeyState::Pressed {
            return None;
        }
        self.registered
            .borrow()
            .iter()
            .find(|(_, hotkey)| hotkey.id() == event.id())
            .map(|(id, _)| *id)
    }
}

impl HotkeyBackend for GlobalHotKeyBackend {
    fn register(
        &self,
        window: WindowHandle,
        id: BindingId,
        modifiers: Modifiers,
        key: VirtualKey,
    ) -> bool {
        let Some(code) = physical_key(key) else {
            warn!(binding_id = %id, key = %key, "key has no global hotkey equivalent");
            return false;
        };
        let hotkey = HotKey::new(Some(modifiers), code);

        match self.manager.register(hotkey) {
            Ok(()) => {
                debug!(binding_id = %id, window = window.raw(), hotkey = ?hotkey, "hotkey registered");
                self.registered.borrow_mut().insert(id, hotkey);
                true
            }
            Err(e) => {
                debug!(binding_id = %id, error = %e, "hotkey registration refused");
                false
            }
        }
    }

    fn unregister(&self, _window: WindowHandle, id: BindingId) -> bool {
        let Some(hotkey) = self.registered.borrow().get(&id).copied() else {
            return false;
        };

        match self.manager.unregister(hotkey) {
            Ok(()) => {
                self.registered.borrow_mut().remove(&id);
                debug!(binding_id = %id, "hotkey unregistered");
                true
            }
            Err(e) => {
                warn!(binding_id = %id, error = %e, "failed to unregister hotkey");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_ids_are_unique_and_increasing() {
        let a = BindingId::next();
        let b = BindingId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }
}
