//! Conversions between the chord model and `global-hotkey` key types.
//!
//! Input surfaces report physical keys as [`Code`]; the hotkey store and the
//! OS registration use virtual-key codes. This module is the single
//! translation table between the two.

use global_hotkey::hotkey::{Code, HotKey, Modifiers};

use crate::{Chord, HotkeyError, Modifier, VirtualKey};

const KEY_TABLE: &[(Code, u16)] = &[
    (Code::Backspace, 0x08),
    (Code::Tab, 0x09),
    (Code::NumpadClear, 0x0C),
    (Code::Enter, 0x0D),
    (Code::NumpadEnter, 0x0D),
    (Code::Pause, 0x13),
    (Code::CapsLock, 0x14),
    (Code::Escape, 0x1B),
    (Code::Space, 0x20),
    (Code::PageUp, 0x21),
    (Code::PageDown, 0x22),
    (Code::End, 0x23),
    (Code::Home, 0x24),
    (Code::ArrowLeft, 0x25),
    (Code::ArrowUp, 0x26),
    (Code::ArrowRight, 0x27),
    (Code::ArrowDown, 0x28),
    (Code::PrintScreen, 0x2C),
    (Code::Insert, 0x2D),
    (Code::Delete, 0x2E),
    (Code::Digit0, 0x30),
    (Code::Digit1, 0x31),
    (Code::Digit2, 0x32),
    (Code::Digit3, 0x33),
    (Code::Digit4, 0x34),
    (Code::Digit5, 0x35),
    (Code::Digit6, 0x36),
    (Code::Digit7, 0x37),
    (Code::Digit8, 0x38),
    (Code::Digit9, 0x39),
    (Code::KeyA, 0x41),
    (Code::KeyB, 0x42),
    (Code::KeyC, 0x43),
    (Code::KeyD, 0x44),
    (Code::KeyE, 0x45),
    (Code::KeyF, 0x46),
    (Code::KeyG, 0x47),
    (Code::KeyH, 0x48),
    (Code::KeyI, 0x49),
    (Code::KeyJ, 0x4A),
    (Code::KeyK, 0x4B),
    (Code::KeyL, 0x4C),
    (Code::KeyM, 0x4D),
    (Code::KeyN, 0x4E),
    (Code::KeyO, 0x4F),
    (Code::KeyP, 0x50),
    (Code::KeyQ, 0x51),
    (Code::KeyR, 0x52),
    (Code::KeyS, 0x53),
    (Code::KeyT, 0x54),
    (Code::KeyU, 0x55),
    (Code::KeyV, 0x56),
    (Code::KeyW, 0x57),
    (Code::KeyX, 0x58),
    (Code::KeyY, 0x59),
    (Code::KeyZ, 0x5A),
    (Code::MetaLeft, 0x5B),
    (Code::MetaRight, 0x5C),
    (Code::ContextMenu, 0x5D),
    (Code::Numpad0, 0x60),
    (Code::Numpad1, 0x61),
    (Code::Numpad2, 0x62),
    (Code::Numpad3, 0x63),
    (Code::Numpad4, 0x64),
    (Code::Numpad5, 0x65),
    (Code::Numpad6, 0x66),
    (Code::Numpad7, 0x67),
    (Code::Numpad8, 0x68),
    (Code::Numpad9, 0x69),
    (Code::NumpadMultiply, 0x6A),
    (Code::NumpadAdd, 0x6B),
    (Code::NumpadSubtract, 0x6D),
    (Code::NumpadDecimal, 0x6E),
    (Code::NumpadDivide, 0x6F),
    (Code::F1, 0x70),
    (Code::F2, 0x71),
    (Code::F3, 0x72),
    (Code::F4, 0x73),
    (Code::F5, 0x74),
    (Code::F6, 0x75),
    (Code::F7, 0x76),
    (Code::F8, 0x77),
    (Code::F9, 0x78),
    (Code::F10, 0x79),
    (Code::F11, 0x7A),
    (Code::F12, 0x7B),
    (Code::F13, 0x7C),
    (Code::F14, 0x7D),
    (Code::F15, 0x7E),
    (Code::F16, 0x7F),
    (Code::F17, 0x80),
    (Code::F18, 0x81),
    (Code::F19, 0x82),
    (Code::F20, 0x83),
    (Code::F21, 0x84),
    (Code::F22, 0x85),
    (Code::F23, 0x86),
    (Code::F24, 0x87),
    (Code::NumLock, 0x90),
    (Code::ScrollLock, 0x91),
    (Code::ShiftLeft, 0xA0),
    (Code::ShiftRight, 0xA1),
    (Code::ControlLeft, 0xA2),
    (Code::ControlRight, 0xA3),
    (Code::AltLeft, 0xA4),
    (Code::AltRight, 0xA5),
    (Code::AudioVolumeMute, 0xAD),
    (Code::AudioVolumeDown, 0xAE),
    (Code::AudioVolumeUp, 0xAF),
    (Code::MediaTrackNext, 0xB0),
    (Code::MediaTrackPrevious, 0xB1),
    (Code::MediaStop, 0xB2),
    (Code::MediaPlayPause, 0xB3),
    (Code::Semicolon, 0xBA),
    (Code::Equal, 0xBB),
    (Code::Comma, 0xBC),
    (Code::Minus, 0xBD),
    (Code::Period, 0xBE),
    (Code::Slash, 0xBF),
    (Code::Backquote, 0xC0),
    (Code::BracketLeft, 0xDB),
    (Code::Backslash, 0xDC),
    (Code::BracketRight, 0xDD),
    (Code::Quote, 0xDE),
];

/// Virtual-key code for a physical key, if it has one.
pub fn virtual_key(code: Code) -> Option<VirtualKey> {
    KEY_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .and_then(|&(_, vk)| VirtualKey::new(vk))
}

/// Physical key for a virtual-key code. Generic modifier codes map to their
/// left-hand key.
pub fn physical_key(key: VirtualKey) -> Option<Code> {
    let code = match key.code() {
        0x10 => Code::ShiftLeft,
        0x11 => Code::ControlLeft,
        0x12 => Code::AltLeft,
        vk => return KEY_TABLE.iter().find(|(_, v)| *v == vk).map(|&(c, _)| c),
    };
    Some(code)
}

/// Builds the `global-hotkey` modifier mask for a set of modifiers.
pub fn modifier_mask(modifiers: impl IntoIterator<Item = Modifier>) -> Modifiers {
    modifiers
        .into_iter()
        .fold(Modifiers::empty(), |mask, m| {
            mask | match m {
                Modifier::Control => Modifiers::CONTROL,
                Modifier::Alt => Modifiers::ALT,
                Modifier::Shift => Modifiers::SHIFT,
                Modifier::Meta => Modifiers::META,
            }
        })
}

/// Splits a `global-hotkey` modifier mask back into modifiers.
pub fn modifiers_from_mask(mask: Modifiers) -> Vec<Modifier> {
    let mut modifiers = Vec::with_capacity(4);
    if mask.contains(Modifiers::CONTROL) {
        modifiers.push(Modifier::Control);
    }
    if mask.contains(Modifiers::ALT) {
        modifiers.push(Modifier::Alt);
    }
    if mask.contains(Modifiers::SHIFT) {
        modifiers.push(Modifier::Shift);
    }
    if mask.intersects(Modifiers::META | Modifiers::SUPER) {
        modifiers.push(Modifier::Meta);
    }
    modifiers
}

/// OS registration support on top of the core [`Chord`].
pub trait ChordExt: Sized {
    /// The modifier mask and single key the OS registration takes.
    fn to_os(&self) -> Result<(Modifiers, VirtualKey), HotkeyError>;

    /// Rebuilds a chord from an OS modifier mask and key.
    fn from_os(mask: Modifiers, key: VirtualKey) -> Self;

    /// The equivalent `global-hotkey` hotkey.
    fn to_hotkey(&self) -> Result<HotKey, HotkeyError>;
}

impl ChordExt for Chord {
    fn to_os(&self) -> Result<(Modifiers, VirtualKey), HotkeyError> {
        let invalid = |reason| HotkeyError::InvalidChord {
            chord: self.clone(),
            reason,
        };
        let key = match self.keys() {
            [] if self.is_empty() => return Err(invalid("the chord is empty")),
            [] => return Err(invalid("a non-modifier key is required")),
            [key] => *key,
            _ => return Err(invalid("only one non-modifier key is supported")),
        };
        Ok((modifier_mask(self.modifiers()), key))
    }

    fn from_os(mask: Modifiers, key: VirtualKey) -> Self {
        Chord::new(modifiers_from_mask(mask), [key])
    }

    fn to_hotkey(&self) -> Result<HotKey, HotkeyError> {
        let (mask, key) = self.to_os()?;
        let code = physical_key(key).ok_or_else(|| HotkeyError::InvalidChord {
            chord: self.clone(),
            reason: "the key has no global hotkey equivalent",
        })?;
        Ok(HotKey::new(Some(mask), code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_round_trip() {
        for &(code, vk) in KEY_TABLE {
            let key = virtual_key(code).unwrap();
            assert_eq!(key.code(), vk);
            // Numpad enter shares the Enter code.
            if code != Code::NumpadEnter {
                assert_eq!(physical_key(key), Some(code), "{code:?}");
            }
        }
    }

    #[test]
    fn test_generic_modifiers_map_to_left_keys() {
        assert_eq!(physical_key(VirtualKey::CONTROL), Some(Code::ControlLeft));
        assert_eq!(physical_key(VirtualKey::SHIFT), Some(Code::ShiftLeft));
        assert_eq!(physical_key(VirtualKey::ALT), Some(Code::AltLeft));
    }

    #[test]
    fn test_modifier_mask_round_trip() {
        let mask = modifier_mask([Modifier::Control, Modifier::Shift]);
        assert_eq!(mask, Modifiers::CONTROL | Modifiers::SHIFT);
        assert_eq!(
            modifiers_from_mask(mask),
            vec![Modifier::Control, Modifier::Shift]
        );
        assert_eq!(modifier_mask([]), Modifiers::empty());
    }

    #[test]
    fn test_to_os() {
        let k = VirtualKey::from_char('k').unwrap();
        let chord = Chord::from_keys([VirtualKey::LEFT_CONTROL, VirtualKey::RIGHT_SHIFT, k]);
        let (mask, key) = chord.to_os().unwrap();
        assert_eq!(mask, Modifiers::CONTROL | Modifiers::SHIFT);
        assert_eq!(key, k);
        assert_eq!(Chord::from_os(mask, key), chord);
    }

    #[test]
    fn test_to_os_rejects_unregistrable_chords() {
        let a = VirtualKey::from_char('a').unwrap();
        let b = VirtualKey::from_char('b').unwrap();
        for chord in [
            Chord::default(),
            Chord::new([Modifier::Control], []),
            Chord::new([Modifier::Control], [a, b]),
        ] {
            assert!(
                matches!(chord.to_os(), Err(HotkeyError::InvalidChord { .. })),
                "{chord}"
            );
        }
    }

    #[test]
    fn test_to_hotkey() {
        let chord: Chord = "Control + Shift + K".parse().unwrap();
        let hotkey = chord.to_hotkey().unwrap();
        assert_eq!(
            hotkey,
            HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::KeyK)
        );
    }
}
