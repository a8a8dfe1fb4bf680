//! Key and modifier codes.
//!
//! Ordinary keys are identified by their Windows virtual-key code, which is
//! also the integer written to the hotkey store. Modifiers use the native
//! modifier flag values (`Alt = 1`, `Control = 2`, `Shift = 4`, `Meta = 8`).

use std::fmt;
use std::str::FromStr;

use crate::ChordError;

/// A virtual-key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualKey(u16);

/// Named codes outside the contiguous letter, digit, numpad and function
/// key ranges.
const NAMED_KEYS: &[(u16, &str)] = &[
    (0x08, "Backspace"),
    (0x09, "Tab"),
    (0x0C, "Clear"),
    (0x0D, "Enter"),
    (0x10, "Shift"),
    (0x11, "Control"),
    (0x12, "Alt"),
    (0x13, "Pause"),
    (0x14, "CapsLock"),
    (0x1B, "Escape"),
    (0x20, "Space"),
    (0x21, "PageUp"),
    (0x22, "PageDown"),
    (0x23, "End"),
    (0x24, "Home"),
    (0x25, "Left"),
    (0x26, "Up"),
    (0x27, "Right"),
    (0x28, "Down"),
    (0x2C, "PrintScreen"),
    (0x2D, "Insert"),
    (0x2E, "Delete"),
    (0x5B, "LWin"),
    (0x5C, "RWin"),
    (0x5D, "Apps"),
    (0x6A, "Multiply"),
    (0x6B, "Add"),
    (0x6D, "Subtract"),
    (0x6E, "Decimal"),
    (0x6F, "Divide"),
    (0x90, "NumLock"),
    (0x91, "ScrollLock"),
    (0xA0, "LShift"),
    (0xA1, "RShift"),
    (0xA2, "LControl"),
    (0xA3, "RControl"),
    (0xA4, "LAlt"),
    (0xA5, "RAlt"),
    (0xAD, "VolumeMute"),
    (0xAE, "VolumeDown"),
    (0xAF, "VolumeUp"),
    (0xB0, "MediaNext"),
    (0xB1, "MediaPrevious"),
    (0xB2, "MediaStop"),
    (0xB3, "MediaPlayPause"),
    (0xBA, "Semicolon"),
    (0xBB, "Equal"),
    (0xBC, "Comma"),
    (0xBD, "Minus"),
    (0xBE, "Period"),
    (0xBF, "Slash"),
    (0xC0, "Backquote"),
    (0xDB, "BracketLeft"),
    (0xDC, "Backslash"),
    (0xDD, "BracketRight"),
    (0xDE, "Quote"),
];

impl VirtualKey {
    pub const BACKSPACE: Self = Self(0x08);
    pub const TAB: Self = Self(0x09);
    pub const ENTER: Self = Self(0x0D);
    pub const SHIFT: Self = Self(0x10);
    pub const CONTROL: Self = Self(0x11);
    pub const ALT: Self = Self(0x12);
    pub const ESCAPE: Self = Self(0x1B);
    pub const SPACE: Self = Self(0x20);
    pub const LEFT_WIN: Self = Self(0x5B);
    pub const RIGHT_WIN: Self = Self(0x5C);
    pub const LEFT_SHIFT: Self = Self(0xA0);
    pub const RIGHT_SHIFT: Self = Self(0xA1);
    pub const LEFT_CONTROL: Self = Self(0xA2);
    pub const RIGHT_CONTROL: Self = Self(0xA3);
    pub const LEFT_ALT: Self = Self(0xA4);
    pub const RIGHT_ALT: Self = Self(0xA5);
    pub const SEMICOLON: Self = Self(0xBA);

    /// Highest valid virtual-key code.
    pub const MAX: u16 = 0xFE;

    /// Creates a key from a raw code, rejecting values outside `1..=0xFE`.
    pub fn new(code: u16) -> Option<Self> {
        (1..=Self::MAX).contains(&code).then_some(Self(code))
    }

    /// Key for an ASCII letter or digit, case insensitive.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            c @ ('A'..='Z' | '0'..='9') => Some(Self(c as u16)),
            _ => None,
        }
    }

    /// Function key `F1` through `F24`.
    pub fn function(n: u8) -> Option<Self> {
        (1..=24).contains(&n).then(|| Self(0x70 + u16::from(n) - 1))
    }

    /// Numeric keypad digit.
    pub fn numpad(n: u8) -> Option<Self> {
        (n <= 9).then(|| Self(0x60 + u16::from(n)))
    }

    /// The raw virtual-key code.
    pub fn code(self) -> u16 {
        self.0
    }

    /// Classifies this key as a modifier or an ordinary key. Left, right
    /// and generic variants of a modifier all map to the same [`Modifier`].
    pub fn classify(self) -> KeyClass {
        let modifier = match self.0 {
            0x10 | 0xA0 | 0xA1 => Modifier::Shift,
            0x11 | 0xA2 | 0xA3 => Modifier::Control,
            0x12 | 0xA4 | 0xA5 => Modifier::Alt,
            0x5B | 0x5C => Modifier::Meta,
            _ => return KeyClass::Ordinary(self),
        };
        KeyClass::Modifier(modifier)
    }

    pub fn is_modifier(self) -> bool {
        matches!(self.classify(), KeyClass::Modifier(_))
    }
}

impl fmt::Display for VirtualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            c @ (0x30..=0x39 | 0x41..=0x5A) => write!(f, "{}", char::from(c as u8)),
            c @ 0x60..=0x69 => write!(f, "Numpad{}", c - 0x60),
            c @ 0x70..=0x87 => write!(f, "F{}", c - 0x70 + 1),
            c => match NAMED_KEYS.iter().find(|(code, _)| *code == c) {
                Some((_, name)) => f.write_str(name),
                None => write!(f, "0x{:02X}", c),
            },
        }
    }
}

impl FromStr for VirtualKey {
    type Err = ChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ChordError::UnknownKeyName(s.to_owned());

        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Self::from_char(c).ok_or_else(unknown);
        }

        if let Some((code, _)) = NAMED_KEYS.iter().find(|(_, n)| n.eq_ignore_ascii_case(s)) {
            return Ok(Self(*code));
        }
        if let Some(n) = s.strip_prefix("Numpad").and_then(|n| n.parse().ok()) {
            return Self::numpad(n).ok_or_else(unknown);
        }
        if let Some(n) = s.strip_prefix('F').and_then(|n| n.parse().ok()) {
            return Self::function(n).ok_or_else(unknown);
        }
        if let Some(hex) = s.strip_prefix("0x") {
            return u16::from_str_radix(hex, 16)
                .ok()
                .and_then(Self::new)
                .ok_or_else(unknown);
        }
        Err(unknown())
    }
}

/// One of the four canonical modifiers.
///
/// The declaration order is the order modifiers are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Control,
    Alt,
    Shift,
    /// The Windows / Command / Super key.
    Meta,
}

impl Modifier {
    pub const ALL: [Modifier; 4] = [
        Modifier::Control,
        Modifier::Alt,
        Modifier::Shift,
        Modifier::Meta,
    ];

    /// Native modifier flag value, as persisted.
    pub fn code(self) -> u32 {
        match self {
            Modifier::Alt => 1,
            Modifier::Control => 2,
            Modifier::Shift => 4,
            Modifier::Meta => 8,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.code() == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            Modifier::Control => "Control",
            Modifier::Alt => "Alt",
            Modifier::Shift => "Shift",
            Modifier::Meta => "Meta",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Modifier {
    type Err = ChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "control" | "ctrl" => Ok(Modifier::Control),
            "alt" | "option" => Ok(Modifier::Alt),
            "shift" => Ok(Modifier::Shift),
            "meta" | "win" | "windows" | "super" | "cmd" | "command" => Ok(Modifier::Meta),
            _ => Err(ChordError::UnknownKeyName(s.to_owned())),
        }
    }
}

/// Result of [`VirtualKey::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    Modifier(Modifier),
    Ordinary(VirtualKey),
}
