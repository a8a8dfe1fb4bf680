//! Captures a key combination from raw key events.
//!
//! The recorder is idle while no keys are held. The first key-down starts a
//! new recording; once every held key has been released the accumulated keys
//! are handed to the completion callback. Entry points may be called from any
//! thread.

use std::collections::HashSet;

use global_hotkey::hotkey::Code;
use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::keymap::virtual_key;
use crate::{Chord, VirtualKey};

type Callback = Box<dyn Fn(Vec<VirtualKey>) + Send + Sync>;

#[derive(Default)]
struct RecordingState {
    held: HashSet<Code>,
    accumulated: Vec<VirtualKey>,
    /// Number of strokes completed so far.
    completed: u64,
}

pub struct KeystrokeRecorder {
    state: Mutex<RecordingState>,
    /// Number of strokes handed to the callback. A stroke is delivered only
    /// once every stroke completed before it has been.
    delivered: Mutex<u64>,
    turn: Condvar,
    on_completed: Callback,
}

impl KeystrokeRecorder {
    /// `on_completed` receives the keys of each finished stroke in press
    /// order, one stroke at a time and in the order the strokes completed.
    /// It runs on the thread that released the last key, outside every
    /// recorder lock, so it may query the recorder. It must not complete a
    /// stroke itself.
    pub fn new(on_completed: impl Fn(Vec<VirtualKey>) + Send + Sync + 'static) -> Self {
        Self {
            state: Mutex::new(RecordingState::default()),
            delivered: Mutex::new(0),
            turn: Condvar::new(),
            on_completed: Box::new(on_completed),
        }
    }

    pub fn on_key_down(&self, code: Code) {
        let Some(key) = virtual_key(code) else {
            debug!(?code, "ignoring key without a virtual-key code");
            return;
        };

        let mut state = self.state.lock();
        if state.held.is_empty() {
            state.accumulated.clear();
        }
        state.held.insert(code);
        if !state.accumulated.contains(&key) {
            state.accumulated.push(key);
        }
    }

    /// Returns true when this release completed a stroke.
    pub fn on_key_up(&self, code: Code) -> bool {
        let (ticket, completed) = {
            let mut state = self.state.lock();
            if !state.held.remove(&code) || !state.held.is_empty() {
                return false;
            }
            let ticket = state.completed;
            state.completed += 1;
            (ticket, state.accumulated.clone())
        };

        let mut delivered = self.delivered.lock();
        while *delivered != ticket {
            self.turn.wait(&mut delivered);
        }
        drop(delivered);

        debug!(keys = completed.len(), "keystroke completed");
        (self.on_completed)(completed);

        *self.delivered.lock() += 1;
        self.turn.notify_all();
        true
    }

    /// The stroke recorded so far, or the last completed one while idle.
    pub fn current_chord(&self) -> Chord {
        Chord::from_keys(self.state.lock().accumulated.iter().copied())
    }

    pub fn current_text(&self) -> String {
        self.current_chord().to_string()
    }

    pub fn is_recording(&self) -> bool {
        !self.state.lock().held.is_empty()
    }

    /// Drops the current recording without emitting it.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.held.clear();
        state.accumulated.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, mpsc};
    use std::thread;
    use std::time::Duration;

    use super::*;

    fn recorder() -> (KeystrokeRecorder, Arc<Mutex<Vec<Vec<VirtualKey>>>>) {
        let strokes = Arc::new(Mutex::new(Vec::new()));
        let sink = strokes.clone();
        let recorder = KeystrokeRecorder::new(move |keys| sink.lock().push(keys));
        (recorder, strokes)
    }

    fn vk(code: Code) -> VirtualKey {
        virtual_key(code).unwrap()
    }

    #[test]
    fn test_emits_once_after_all_keys_released() {
        let (recorder, strokes) = recorder();
        recorder.on_key_down(Code::ControlLeft);
        recorder.on_key_down(Code::ShiftLeft);
        recorder.on_key_down(Code::KeyK);

        assert!(!recorder.on_key_up(Code::KeyK));
        assert!(!recorder.on_key_up(Code::ControlLeft));
        assert!(strokes.lock().is_empty());
        assert!(recorder.on_key_up(Code::ShiftLeft));

        assert_eq!(
            *strokes.lock(),
            vec![vec![vk(Code::ControlLeft), vk(Code::ShiftLeft), vk(Code::KeyK)]]
        );
        assert_eq!(recorder.current_text(), "Control + Shift + K");
        assert!(!recorder.is_recording());
    }

    #[test]
    fn test_repeated_key_down_is_recorded_once() {
        let (recorder, strokes) = recorder();
        recorder.on_key_down(Code::KeyA);
        recorder.on_key_down(Code::KeyA);
        recorder.on_key_down(Code::KeyA);
        recorder.on_key_up(Code::KeyA);
        assert_eq!(*strokes.lock(), vec![vec![vk(Code::KeyA)]]);
    }

    #[test]
    fn test_new_stroke_clears_previous() {
        let (recorder, strokes) = recorder();
        recorder.on_key_down(Code::KeyA);
        recorder.on_key_up(Code::KeyA);
        recorder.on_key_down(Code::KeyB);
        assert_eq!(recorder.current_text(), "B");
        recorder.on_key_up(Code::KeyB);

        assert_eq!(
            *strokes.lock(),
            vec![vec![vk(Code::KeyA)], vec![vk(Code::KeyB)]]
        );
    }

    #[test]
    fn test_keys_pressed_after_partial_release_accumulate() {
        let (recorder, strokes) = recorder();
        recorder.on_key_down(Code::ControlLeft);
        recorder.on_key_down(Code::KeyA);
        recorder.on_key_up(Code::KeyA);
        recorder.on_key_down(Code::KeyB);
        recorder.on_key_up(Code::KeyB);
        recorder.on_key_up(Code::ControlLeft);

        assert_eq!(
            *strokes.lock(),
            vec![vec![vk(Code::ControlLeft), vk(Code::KeyA), vk(Code::KeyB)]]
        );
    }

    #[test]
    fn test_release_of_unheld_key_is_ignored() {
        let (recorder, strokes) = recorder();
        assert!(!recorder.on_key_up(Code::KeyQ));
        recorder.on_key_down(Code::KeyA);
        assert!(!recorder.on_key_up(Code::KeyQ));
        assert!(recorder.is_recording());
        assert!(strokes.lock().is_empty());
    }

    #[test]
    fn test_unmapped_codes_are_ignored() {
        let (recorder, strokes) = recorder();
        recorder.on_key_down(Code::Fn);
        assert!(!recorder.is_recording());
        assert!(!recorder.on_key_up(Code::Fn));
        assert!(strokes.lock().is_empty());
    }

    #[test]
    fn test_reset_discards_recording() {
        let (recorder, strokes) = recorder();
        recorder.on_key_down(Code::ControlLeft);
        recorder.on_key_down(Code::KeyZ);
        recorder.reset();

        assert!(recorder.current_chord().is_empty());
        assert!(!recorder.on_key_up(Code::KeyZ));
        assert!(!recorder.on_key_up(Code::ControlLeft));
        assert!(strokes.lock().is_empty());
    }

    #[test]
    fn test_concurrent_presses_emit_one_stroke() {
        let (recorder, strokes) = recorder();
        let recorder = Arc::new(recorder);
        let codes = [Code::KeyA, Code::KeyB, Code::KeyC, Code::KeyD];

        // Hold a key so the threads' strokes join one recording.
        recorder.on_key_down(Code::ShiftLeft);
        let handles: Vec<_> = codes
            .into_iter()
            .map(|code| {
                let recorder = recorder.clone();
                thread::spawn(move || {
                    recorder.on_key_down(code);
                    recorder.on_key_up(code);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(strokes.lock().is_empty());
        assert!(recorder.on_key_up(Code::ShiftLeft));

        let strokes = strokes.lock();
        assert_eq!(strokes.len(), 1);
        let mut keys = strokes[0].clone();
        keys.sort();
        let mut expected: Vec<_> = codes.into_iter().map(vk).collect();
        expected.push(vk(Code::ShiftLeft));
        expected.sort();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_callback_can_query_recorder() {
        let seen = Arc::new(Mutex::new(None));
        let recorder = Arc::new_cyclic(|weak: &std::sync::Weak<KeystrokeRecorder>| {
            let weak = weak.clone();
            let seen = seen.clone();
            KeystrokeRecorder::new(move |_| {
                if let Some(recorder) = weak.upgrade() {
                    *seen.lock() = Some(recorder.current_text());
                }
            })
        });

        recorder.on_key_down(Code::AltLeft);
        recorder.on_key_down(Code::F4);
        recorder.on_key_up(Code::F4);
        recorder.on_key_up(Code::AltLeft);
        assert_eq!(seen.lock().as_deref(), Some("Alt + F4"));
    }

    #[test]
    fn test_strokes_are_delivered_in_completion_order() {
        let strokes = Arc::new(Mutex::new(Vec::new()));
        let (entered_tx, entered_rx) = mpsc::channel();
        let entered_tx = Mutex::new(Some(entered_tx));
        let sink = strokes.clone();
        let recorder = Arc::new(KeystrokeRecorder::new(move |keys: Vec<VirtualKey>| {
            // Stall the first delivery so a second stroke completes meanwhile.
            if let Some(tx) = entered_tx.lock().take() {
                tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(100));
            }
            sink.lock().push(keys);
        }));

        let first = {
            let recorder = recorder.clone();
            thread::spawn(move || {
                recorder.on_key_down(Code::KeyA);
                recorder.on_key_up(Code::KeyA);
            })
        };
        entered_rx.recv().unwrap();
        recorder.on_key_down(Code::KeyB);
        recorder.on_key_up(Code::KeyB);
        first.join().unwrap();

        assert_eq!(
            *strokes.lock(),
            vec![vec![vk(Code::KeyA)], vec![vk(Code::KeyB)]]
        );
    }
}
