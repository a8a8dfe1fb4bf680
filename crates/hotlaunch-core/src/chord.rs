//! The canonical key combination type.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::key::{KeyClass, Modifier, VirtualKey};
use crate::ChordError;

const SEPARATOR: &str = " + ";

/// A key combination: a set of modifiers plus the ordinary keys in the order
/// they were first pressed.
///
/// Renders as `"Control + Shift + K"`. The empty chord renders as an empty
/// string and can never be registered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Chord {
    modifiers: BTreeSet<Modifier>,
    keys: Vec<VirtualKey>,
}

impl Chord {
    /// Builds a chord from explicit parts. Modifier-class keys passed in
    /// `keys` are folded into the modifier set.
    pub fn new(
        modifiers: impl IntoIterator<Item = Modifier>,
        keys: impl IntoIterator<Item = VirtualKey>,
    ) -> Self {
        let mut chord = Self {
            modifiers: modifiers.into_iter().collect(),
            keys: Vec::new(),
        };
        chord.extend(keys);
        chord
    }

    /// Partitions a set of raw keys into modifiers and ordinary keys.
    pub fn from_keys(keys: impl IntoIterator<Item = VirtualKey>) -> Self {
        Self::new([], keys)
    }

    /// Rebuilds a chord from persisted modifier and key codes.
    pub fn from_codes(modifier_codes: &[u32], key_codes: &[u32]) -> Result<Self, ChordError> {
        let modifiers = modifier_codes
            .iter()
            .map(|&c| Modifier::from_code(c).ok_or(ChordError::UnknownModifierCode(c)))
            .collect::<Result<Vec<_>, _>>()?;
        let keys = key_codes
            .iter()
            .map(|&c| {
                u16::try_from(c)
                    .ok()
                    .and_then(VirtualKey::new)
                    .ok_or(ChordError::InvalidKeyCode(c))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(modifiers, keys))
    }

    fn extend(&mut self, keys: impl IntoIterator<Item = VirtualKey>) {
        for key in keys {
            match key.classify() {
                KeyClass::Modifier(m) => {
                    self.modifiers.insert(m);
                }
                KeyClass::Ordinary(k) => {
                    if !self.keys.contains(&k) {
                        self.keys.push(k);
                    }
                }
            }
        }
    }

    /// Modifiers in rendering order.
    pub fn modifiers(&self) -> impl Iterator<Item = Modifier> + '_ {
        self.modifiers.iter().copied()
    }

    /// Ordinary keys in press order.
    pub fn keys(&self) -> &[VirtualKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty() && self.keys.is_empty()
    }

    /// Modifier codes for the store.
    pub fn modifier_codes(&self) -> Vec<u32> {
        self.modifiers().map(Modifier::code).collect()
    }

    /// Key codes for the store.
    pub fn key_codes(&self) -> Vec<u32> {
        self.keys.iter().map(|k| u32::from(k.code())).collect()
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let names = self
            .modifiers()
            .map(|m| m.to_string())
            .chain(self.keys.iter().map(|k| k.to_string()));
        for name in names {
            if !first {
                f.write_str(SEPARATOR)?;
            }
            f.write_str(&name)?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for Chord {
    type Err = ChordError;

    /// Parses the rendered form. Tokens are separated by `+`, surrounding
    /// whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut modifiers = Vec::new();
        let mut keys = Vec::new();
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        for token in s.split('+').map(str::trim) {
            if token.is_empty() {
                return Err(ChordError::UnknownKeyName(s.to_owned()));
            }
            match token.parse::<Modifier>() {
                Ok(m) => modifiers.push(m),
                Err(_) => keys.push(token.parse::<VirtualKey>()?),
            }
        }
        Ok(Self::new(modifiers, keys))
    }
}
