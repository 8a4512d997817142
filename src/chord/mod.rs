mod parser;

pub use parser::{parse_chord, DELIMITER};

use crate::error::CaptureError;
use crate::events::{KeyCode, Modifiers};
use std::fmt;
use std::str::FromStr;

/// Сочетание клавиш: множество модификаторов плюс одна основная клавиша.
///
/// Основная клавиша никогда не является модификатором. Два сочетания равны,
/// если совпадают основная клавиша и множество модификаторов (порядок не важен).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chord {
    modifiers: Modifiers,
    key: KeyCode,
}

impl Chord {
    /// Возвращает `None`, если `key` сам является модификатором
    pub fn new(modifiers: Modifiers, key: KeyCode) -> Option<Self> {
        if key.is_modifier() {
            return None;
        }
        Some(Self { modifiers, key })
    }

    pub fn parse(spec: &str) -> crate::error::Result<Self> {
        parse_chord(spec)
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn key(&self) -> KeyCode {
        self.key
    }
}

impl FromStr for Chord {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_chord(s)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in self.modifiers.iter() {
            write!(f, "{}{}", modifier.name(), DELIMITER)?;
        }
        write!(f, "{}", self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ModifierKey;

    #[test]
    fn test_modifier_cannot_be_primary_key() {
        assert!(Chord::new(Modifiers::new(), KeyCode::LeftShift).is_none());
        assert!(Chord::new(Modifiers::new().with_ctrl(true), KeyCode::K).is_some());
    }

    #[test]
    fn test_display_round_trips_through_parser() {
        let modifiers: Modifiers = [ModifierKey::Meta, ModifierKey::Control].into_iter().collect();
        let chord = Chord::new(modifiers, KeyCode::PageUp).expect("pageup is not a modifier");

        assert_eq!(chord.to_string(), "ctrl+super+pageup");
        assert_eq!(chord.to_string().parse::<Chord>().ok(), Some(chord));
    }
}
