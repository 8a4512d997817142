use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::mappings::key_names::KeyNames;

/// Идентификатор keybind, назначаемый вызывающим кодом
pub type KeybindId = u32;

/// Состояние клавиши
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyState {
    Pressed,
    Released,
    /// Автоповтор ОС при удержании клавиши
    Repeat,
}

/// Платформенно-независимый код клавиши.
///
/// Трансляция из кодов конкретной платформы выполняется на границе источника событий
/// (см. `mappings`), поэтому Registry и Matcher не знают ничего о платформе.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyCode {
    // Буквенные клавиши
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    // Цифровые клавиши (верхний ряд)
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Digit0,

    // Функциональные клавиши
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,

    // Специальные клавиши
    Escape,
    Enter,
    Tab,
    Space,
    Backspace,
    Delete,
    Insert,

    // Навигация
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,

    // Знаки пунктуации
    Minus,
    Equal,
    LeftBracket,
    RightBracket,
    Backslash,
    Semicolon,
    Apostrophe,
    Grave,
    Comma,
    Period,
    Slash,

    // Системные клавиши
    CapsLock,
    NumLock,
    ScrollLock,
    PrintScreen,
    Pause,
    Menu,

    // Цифровой блок
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadAdd,
    NumpadSubtract,
    NumpadMultiply,
    NumpadDivide,
    NumpadDecimal,
    NumpadEnter,

    // Мультимедиа
    VolumeUp,
    VolumeDown,
    VolumeMute,
    MediaPlayPause,
    MediaNext,
    MediaPrevious,
    MediaStop,

    // Модификаторы (левые и правые)
    LeftControl,
    RightControl,
    LeftShift,
    RightShift,
    LeftAlt,
    RightAlt,
    LeftMeta,
    RightMeta,
}

impl KeyCode {
    /// Модификатор, которому соответствует клавиша (левая и правая клавиши нормализуются)
    pub fn modifier(&self) -> Option<ModifierKey> {
        match self {
            KeyCode::LeftControl | KeyCode::RightControl => Some(ModifierKey::Control),
            KeyCode::LeftShift | KeyCode::RightShift => Some(ModifierKey::Shift),
            KeyCode::LeftAlt | KeyCode::RightAlt => Some(ModifierKey::Alt),
            KeyCode::LeftMeta | KeyCode::RightMeta => Some(ModifierKey::Meta),
            _ => None,
        }
    }

    pub fn is_modifier(&self) -> bool {
        self.modifier().is_some()
    }

    /// Каноническое имя клавиши (то, что принимает парсер сочетаний)
    pub fn name(&self) -> &'static str {
        KeyNames::canonical_name(*self)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Клавиша-модификатор
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKey {
    Control,
    Shift,
    Alt,
    /// Super / Win / Cmd
    Meta,
}

impl ModifierKey {
    pub const ALL: [ModifierKey; 4] = [
        ModifierKey::Control,
        ModifierKey::Alt,
        ModifierKey::Shift,
        ModifierKey::Meta,
    ];

    /// Левая физическая клавиша модификатора
    pub fn left_key(&self) -> KeyCode {
        match self {
            ModifierKey::Control => KeyCode::LeftControl,
            ModifierKey::Shift => KeyCode::LeftShift,
            ModifierKey::Alt => KeyCode::LeftAlt,
            ModifierKey::Meta => KeyCode::LeftMeta,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModifierKey::Control => "ctrl",
            ModifierKey::Shift => "shift",
            ModifierKey::Alt => "alt",
            ModifierKey::Meta => "super",
        }
    }
}

/// Множество зажатых модификаторов
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub super_key: bool,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ctrl(mut self, ctrl: bool) -> Self {
        self.ctrl = ctrl;
        self
    }

    pub fn with_alt(mut self, alt: bool) -> Self {
        self.alt = alt;
        self
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn with_super(mut self, super_key: bool) -> Self {
        self.super_key = super_key;
        self
    }

    fn slot(&mut self, modifier: ModifierKey) -> &mut bool {
        match modifier {
            ModifierKey::Control => &mut self.ctrl,
            ModifierKey::Alt => &mut self.alt,
            ModifierKey::Shift => &mut self.shift,
            ModifierKey::Meta => &mut self.super_key,
        }
    }

    /// Добавить модификатор; возвращает false, если он уже был в множестве
    pub fn insert(&mut self, modifier: ModifierKey) -> bool {
        let slot = self.slot(modifier);
        let was_set = *slot;
        *slot = true;
        !was_set
    }

    pub fn remove(&mut self, modifier: ModifierKey) -> bool {
        let slot = self.slot(modifier);
        let was_set = *slot;
        *slot = false;
        was_set
    }

    pub fn contains(&self, modifier: ModifierKey) -> bool {
        match modifier {
            ModifierKey::Control => self.ctrl,
            ModifierKey::Alt => self.alt,
            ModifierKey::Shift => self.shift,
            ModifierKey::Meta => self.super_key,
        }
    }

    pub fn union(&self, other: &Modifiers) -> Modifiers {
        Modifiers {
            ctrl: self.ctrl || other.ctrl,
            alt: self.alt || other.alt,
            shift: self.shift || other.shift,
            super_key: self.super_key || other.super_key,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift && !self.super_key
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Модификаторы в каноническом порядке: ctrl, alt, shift, super
    pub fn iter(&self) -> impl Iterator<Item = ModifierKey> + '_ {
        ModifierKey::ALL.into_iter().filter(|m| self.contains(*m))
    }
}

impl FromIterator<ModifierKey> for Modifiers {
    fn from_iter<I: IntoIterator<Item = ModifierKey>>(iter: I) -> Self {
        let mut result = Self::new();
        for modifier in iter {
            result.insert(modifier);
        }
        result
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<&str> = self.iter().map(|m| m.name()).collect();
        write!(f, "{}", names.join("+"))
    }
}

/// Сырое событие клавиатуры от источника событий
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub key_code: KeyCode,
    pub state: KeyState,
    /// Модификаторы, зажатые по данным платформы на момент события
    pub modifiers: Modifiers,
    pub timestamp: Instant,
    pub device_name: String,
}

impl RawKeyEvent {
    pub fn new(
        key_code: KeyCode,
        state: KeyState,
        modifiers: Modifiers,
        device_name: impl Into<String>,
    ) -> Self {
        Self {
            key_code,
            state,
            modifiers,
            timestamp: Instant::now(),
            device_name: device_name.into(),
        }
    }

    pub fn press(key_code: KeyCode, modifiers: Modifiers) -> Self {
        Self::new(key_code, KeyState::Pressed, modifiers, "synthetic")
    }

    pub fn release(key_code: KeyCode, modifiers: Modifiers) -> Self {
        Self::new(key_code, KeyState::Released, modifiers, "synthetic")
    }

    /// Текстовый идентификатор комбинации для логов
    pub fn combination_id(&self) -> String {
        if self.modifiers.is_empty() {
            format!("{}", self.key_code)
        } else {
            format!("{}+{}", self.modifiers, self.key_code)
        }
    }
}

impl fmt::Display for RawKeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] {:?} ({})",
            self.combination_id(),
            self.device_name,
            self.state,
            self.timestamp.elapsed().as_millis()
        )
    }
}

/// Срабатывание keybind, доставляемое вызывающему коду
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeybindTrigger {
    Pressed(KeybindId),
    Released(KeybindId),
}

impl KeybindTrigger {
    pub fn id(&self) -> KeybindId {
        match self {
            KeybindTrigger::Pressed(id) | KeybindTrigger::Released(id) => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_creation() {
        let modifiers = Modifiers::new().with_ctrl(true).with_shift(true);

        assert!(modifiers.ctrl);
        assert!(modifiers.shift);
        assert!(!modifiers.alt);
        assert!(!modifiers.super_key);
        assert_eq!(modifiers.len(), 2);
    }

    #[test]
    fn test_modifiers_set_semantics() {
        let mut modifiers = Modifiers::new();
        assert!(modifiers.insert(ModifierKey::Alt));
        assert!(!modifiers.insert(ModifierKey::Alt));
        assert!(modifiers.contains(ModifierKey::Alt));

        let reversed: Modifiers = [ModifierKey::Meta, ModifierKey::Alt].into_iter().collect();
        let ordered: Modifiers = [ModifierKey::Alt, ModifierKey::Meta].into_iter().collect();
        assert_eq!(reversed, ordered);

        assert!(modifiers.remove(ModifierKey::Alt));
        assert!(!modifiers.remove(ModifierKey::Alt));
        assert!(modifiers.is_empty());
    }

    #[test]
    fn test_modifiers_display_is_canonical() {
        let modifiers: Modifiers = [ModifierKey::Meta, ModifierKey::Shift, ModifierKey::Control]
            .into_iter()
            .collect();
        assert_eq!(modifiers.to_string(), "ctrl+shift+super");
        assert_eq!(Modifiers::new().to_string(), "none");
    }

    #[test]
    fn test_key_code_modifier_normalization() {
        assert_eq!(KeyCode::RightControl.modifier(), Some(ModifierKey::Control));
        assert_eq!(KeyCode::LeftMeta.modifier(), Some(ModifierKey::Meta));
        assert!(KeyCode::K.modifier().is_none());
        assert_eq!(ModifierKey::Shift.left_key(), KeyCode::LeftShift);
    }

    #[test]
    fn test_key_event_combination_id() {
        let plain = RawKeyEvent::press(KeyCode::K, Modifiers::new());
        let with_ctrl = RawKeyEvent::press(KeyCode::K, Modifiers::new().with_ctrl(true));

        assert_eq!(plain.combination_id(), "k");
        assert_eq!(with_ctrl.combination_id(), "ctrl+k");
    }
}
