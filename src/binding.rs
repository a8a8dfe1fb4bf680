//! A single live OS hotkey registration.

use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::backend::{BindingId, HotkeyBackend, WindowHandle};
use crate::keymap::ChordExt;
use crate::{Chord, HotkeyError, Result};

/// Owns exactly one OS registration for one hotkey entry.
///
/// The registry releases bindings explicitly with [`HotkeyBinding::release`].
/// Dropping a binding that is still registered releases it as a fallback
/// and logs a warning.
pub struct HotkeyBinding {
    id: BindingId,
    entry_id: String,
    chord: Chord,
    window: WindowHandle,
    backend: Rc<dyn HotkeyBackend>,
    registered: bool,
    subscribed: bool,
}

impl HotkeyBinding {
    /// Registers `chord` with the OS on behalf of `entry_id`.
    pub fn create(
        entry_id: impl Into<String>,
        chord: Chord,
        window: WindowHandle,
        backend: Rc<dyn HotkeyBackend>,
    ) -> Result<Self> {
        let mut binding = Self {
            id: BindingId::next(),
            entry_id: entry_id.into(),
            chord,
            window,
            backend,
            registered: false,
            subscribed: false,
        };
        binding.register()?;
        info!(
            entry_id = %binding.entry_id,
            binding_id = %binding.id,
            chord = %binding.chord,
            "hotkey bound"
        );
        Ok(binding)
    }

    /// (Re)registers the chord, unregistering the current registration
    /// first. Fails with `RegistrationConflict` when the OS refuses it and
    /// with `ReleaseRefused` when the current registration cannot be undone.
    pub fn register(&mut self) -> Result<()> {
        let (modifiers, key) = self.chord.to_os()?;
        if self.registered && !self.unregister() {
            return Err(HotkeyError::ReleaseRefused {
                chord: self.chord.clone(),
            });
        }

        if !self.backend.register(self.window, self.id, modifiers, key) {
            return Err(HotkeyError::RegistrationConflict {
                chord: self.chord.clone(),
            });
        }
        self.registered = true;
        self.subscribed = true;
        Ok(())
    }

    fn unregister(&mut self) -> bool {
        if self.backend.unregister(self.window, self.id) {
            self.registered = false;
        } else {
            warn!(binding_id = %self.id, chord = %self.chord, "OS refused to unregister hotkey");
        }
        !self.registered
    }

    /// Unregisters from the OS and stops reacting to fire messages. Safe to
    /// call any number of times.
    ///
    /// Returns false when the OS refused; the binding then stays live and
    /// the release can be retried.
    pub fn release(&mut self) -> bool {
        if self.registered {
            if !self.unregister() {
                return false;
            }
            debug!(entry_id = %self.entry_id, binding_id = %self.id, "hotkey released");
        }
        self.subscribed = false;
        true
    }

    /// Returns the entry id when a fire message for `id` belongs to this
    /// binding.
    pub fn handle_message(&self, id: BindingId) -> Option<&str> {
        (self.subscribed && self.registered && self.id == id).then_some(self.entry_id.as_str())
    }

    pub fn id(&self) -> BindingId {
        self.id
    }

    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    pub fn chord(&self) -> &Chord {
        &self.chord
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }
}

impl Drop for HotkeyBinding {
    fn drop(&mut self) {
        if self.registered {
            warn!(
                entry_id = %self.entry_id,
                binding_id = %self.id,
                "hotkey binding dropped without release"
            );
            self.release();
        }
    }
}

impl std::fmt::Debug for HotkeyBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotkeyBinding")
            .field("id", &self.id)
            .field("entry_id", &self.entry_id)
            .field("chord", &self.chord.to_string())
            .field("registered", &self.registered)
            .finish()
    }
}
