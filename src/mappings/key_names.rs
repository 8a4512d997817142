use crate::events::KeyCode;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Маппинг между текстовыми именами клавиш и `KeyCode`.
/// Первое имя для каждого кода считается каноническим.
pub struct KeyNames;

static KEY_NAMES: &[(&str, KeyCode)] = &[
    // Буквенные клавиши
    ("a", KeyCode::A),
    ("b", KeyCode::B),
    ("c", KeyCode::C),
    ("d", KeyCode::D),
    ("e", KeyCode::E),
    ("f", KeyCode::F),
    ("g", KeyCode::G),
    ("h", KeyCode::H),
    ("i", KeyCode::I),
    ("j", KeyCode::J),
    ("k", KeyCode::K),
    ("l", KeyCode::L),
    ("m", KeyCode::M),
    ("n", KeyCode::N),
    ("o", KeyCode::O),
    ("p", KeyCode::P),
    ("q", KeyCode::Q),
    ("r", KeyCode::R),
    ("s", KeyCode::S),
    ("t", KeyCode::T),
    ("u", KeyCode::U),
    ("v", KeyCode::V),
    ("w", KeyCode::W),
    ("x", KeyCode::X),
    ("y", KeyCode::Y),
    ("z", KeyCode::Z),

    // Цифровые клавиши (верхний ряд)
    ("1", KeyCode::Digit1),
    ("2", KeyCode::Digit2),
    ("3", KeyCode::Digit3),
    ("4", KeyCode::Digit4),
    ("5", KeyCode::Digit5),
    ("6", KeyCode::Digit6),
    ("7", KeyCode::Digit7),
    ("8", KeyCode::Digit8),
    ("9", KeyCode::Digit9),
    ("0", KeyCode::Digit0),

    // Функциональные клавиши
    ("f1", KeyCode::F1),
    ("f2", KeyCode::F2),
    ("f3", KeyCode::F3),
    ("f4", KeyCode::F4),
    ("f5", KeyCode::F5),
    ("f6", KeyCode::F6),
    ("f7", KeyCode::F7),
    ("f8", KeyCode::F8),
    ("f9", KeyCode::F9),
    ("f10", KeyCode::F10),
    ("f11", KeyCode::F11),
    ("f12", KeyCode::F12),
    ("f13", KeyCode::F13),
    ("f14", KeyCode::F14),
    ("f15", KeyCode::F15),
    ("f16", KeyCode::F16),
    ("f17", KeyCode::F17),
    ("f18", KeyCode::F18),
    ("f19", KeyCode::F19),
    ("f20", KeyCode::F20),
    ("f21", KeyCode::F21),
    ("f22", KeyCode::F22),
    ("f23", KeyCode::F23),
    ("f24", KeyCode::F24),

    // Специальные клавиши
    ("escape", KeyCode::Escape), ("esc", KeyCode::Escape),
    ("enter", KeyCode::Enter), ("return", KeyCode::Enter),
    ("tab", KeyCode::Tab),
    ("space", KeyCode::Space), ("spacebar", KeyCode::Space),
    ("backspace", KeyCode::Backspace),
    ("delete", KeyCode::Delete), ("del", KeyCode::Delete),
    ("insert", KeyCode::Insert), ("ins", KeyCode::Insert),

    // Навигация
    ("home", KeyCode::Home),
    ("end", KeyCode::End),
    ("pageup", KeyCode::PageUp), ("pgup", KeyCode::PageUp),
    ("pagedown", KeyCode::PageDown), ("pgdn", KeyCode::PageDown),
    ("up", KeyCode::Up), ("arrowup", KeyCode::Up),
    ("down", KeyCode::Down), ("arrowdown", KeyCode::Down),
    ("left", KeyCode::Left), ("arrowleft", KeyCode::Left),
    ("right", KeyCode::Right), ("arrowright", KeyCode::Right),

    // Знаки пунктуации
    ("minus", KeyCode::Minus), ("-", KeyCode::Minus),
    ("equal", KeyCode::Equal), ("=", KeyCode::Equal),
    ("leftbracket", KeyCode::LeftBracket), ("bracketleft", KeyCode::LeftBracket), ("[", KeyCode::LeftBracket),
    ("rightbracket", KeyCode::RightBracket), ("bracketright", KeyCode::RightBracket), ("]", KeyCode::RightBracket),
    ("backslash", KeyCode::Backslash), ("\\", KeyCode::Backslash),
    ("semicolon", KeyCode::Semicolon), (";", KeyCode::Semicolon),
    ("apostrophe", KeyCode::Apostrophe), ("quote", KeyCode::Apostrophe), ("'", KeyCode::Apostrophe),
    ("grave", KeyCode::Grave), ("backquote", KeyCode::Grave), ("`", KeyCode::Grave),
    ("comma", KeyCode::Comma), (",", KeyCode::Comma),
    ("period", KeyCode::Period), ("dot", KeyCode::Period), (".", KeyCode::Period),
    ("slash", KeyCode::Slash), ("/", KeyCode::Slash),

    // Системные клавиши
    ("capslock", KeyCode::CapsLock),
    ("numlock", KeyCode::NumLock),
    ("scrolllock", KeyCode::ScrollLock),
    ("printscreen", KeyCode::PrintScreen), ("print", KeyCode::PrintScreen), ("prtsc", KeyCode::PrintScreen),
    ("pause", KeyCode::Pause), ("break", KeyCode::Pause),
    ("menu", KeyCode::Menu), ("contextmenu", KeyCode::Menu), ("apps", KeyCode::Menu),

    // Цифровой блок
    ("numpad0", KeyCode::Numpad0), ("num0", KeyCode::Numpad0), ("kp0", KeyCode::Numpad0),
    ("numpad1", KeyCode::Numpad1), ("num1", KeyCode::Numpad1), ("kp1", KeyCode::Numpad1),
    ("numpad2", KeyCode::Numpad2), ("num2", KeyCode::Numpad2), ("kp2", KeyCode::Numpad2),
    ("numpad3", KeyCode::Numpad3), ("num3", KeyCode::Numpad3), ("kp3", KeyCode::Numpad3),
    ("numpad4", KeyCode::Numpad4), ("num4", KeyCode::Numpad4), ("kp4", KeyCode::Numpad4),
    ("numpad5", KeyCode::Numpad5), ("num5", KeyCode::Numpad5), ("kp5", KeyCode::Numpad5),
    ("numpad6", KeyCode::Numpad6), ("num6", KeyCode::Numpad6), ("kp6", KeyCode::Numpad6),
    ("numpad7", KeyCode::Numpad7), ("num7", KeyCode::Numpad7), ("kp7", KeyCode::Numpad7),
    ("numpad8", KeyCode::Numpad8), ("num8", KeyCode::Numpad8), ("kp8", KeyCode::Numpad8),
    ("numpad9", KeyCode::Numpad9), ("num9", KeyCode::Numpad9), ("kp9", KeyCode::Numpad9),
    ("numpadadd", KeyCode::NumpadAdd), ("numadd", KeyCode::NumpadAdd), ("kpplus", KeyCode::NumpadAdd),
    ("numpadsubtract", KeyCode::NumpadSubtract), ("numsub", KeyCode::NumpadSubtract), ("kpminus", KeyCode::NumpadSubtract),
    ("numpadmultiply", KeyCode::NumpadMultiply), ("nummul", KeyCode::NumpadMultiply), ("kpasterisk", KeyCode::NumpadMultiply),
    ("numpaddivide", KeyCode::NumpadDivide), ("numdiv", KeyCode::NumpadDivide), ("kpslash", KeyCode::NumpadDivide),
    ("numpaddecimal", KeyCode::NumpadDecimal), ("numdec", KeyCode::NumpadDecimal), ("kpdot", KeyCode::NumpadDecimal),
    ("numpadenter", KeyCode::NumpadEnter), ("numenter", KeyCode::NumpadEnter), ("kpenter", KeyCode::NumpadEnter),

    // Мультимедиа
    ("volumeup", KeyCode::VolumeUp), ("audiovolumeup", KeyCode::VolumeUp),
    ("volumedown", KeyCode::VolumeDown), ("audiovolumedown", KeyCode::VolumeDown),
    ("volumemute", KeyCode::VolumeMute), ("mute", KeyCode::VolumeMute), ("audiovolumemute", KeyCode::VolumeMute),
    ("mediaplaypause", KeyCode::MediaPlayPause), ("playpause", KeyCode::MediaPlayPause),
    ("medianext", KeyCode::MediaNext), ("nexttrack", KeyCode::MediaNext), ("mediatracknext", KeyCode::MediaNext),
    ("mediaprevious", KeyCode::MediaPrevious), ("mediaprev", KeyCode::MediaPrevious), ("prevtrack", KeyCode::MediaPrevious), ("mediatrackprevious", KeyCode::MediaPrevious),
    ("mediastop", KeyCode::MediaStop),

    // Модификаторы (левые и правые)
    ("ctrl", KeyCode::LeftControl), ("control", KeyCode::LeftControl), ("leftctrl", KeyCode::LeftControl), ("lctrl", KeyCode::LeftControl), ("leftcontrol", KeyCode::LeftControl),
    ("rightctrl", KeyCode::RightControl), ("rctrl", KeyCode::RightControl), ("rightcontrol", KeyCode::RightControl),
    ("shift", KeyCode::LeftShift), ("leftshift", KeyCode::LeftShift), ("lshift", KeyCode::LeftShift),
    ("rightshift", KeyCode::RightShift), ("rshift", KeyCode::RightShift),
    ("alt", KeyCode::LeftAlt), ("option", KeyCode::LeftAlt), ("leftalt", KeyCode::LeftAlt), ("lalt", KeyCode::LeftAlt),
    ("rightalt", KeyCode::RightAlt), ("ralt", KeyCode::RightAlt), ("altgr", KeyCode::RightAlt),
    ("super", KeyCode::LeftMeta), ("meta", KeyCode::LeftMeta), ("win", KeyCode::LeftMeta), ("cmd", KeyCode::LeftMeta), ("command", KeyCode::LeftMeta), ("logo", KeyCode::LeftMeta), ("leftmeta", KeyCode::LeftMeta), ("lmeta", KeyCode::LeftMeta), ("leftsuper", KeyCode::LeftMeta),
    ("rightmeta", KeyCode::RightMeta), ("rmeta", KeyCode::RightMeta), ("rightsuper", KeyCode::RightMeta), ("rsuper", KeyCode::RightMeta),
];

static NAME_TO_CODE: Lazy<HashMap<&'static str, KeyCode>> =
    Lazy::new(|| KEY_NAMES.iter().copied().collect());

static CODE_TO_NAME: Lazy<HashMap<KeyCode, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for &(name, code) in KEY_NAMES {
        map.entry(code).or_insert(name);
    }
    map
});

impl KeyNames {
    /// Получить код клавиши по имени (регистронезависимо)
    pub fn lookup(key_name: &str) -> Option<KeyCode> {
        let normalized = key_name.to_lowercase();
        NAME_TO_CODE.get(normalized.as_str()).copied()
    }

    /// Каноническое имя клавиши
    pub fn canonical_name(code: KeyCode) -> &'static str {
        CODE_TO_NAME.get(&code).copied().unwrap_or("unknown")
    }

    /// Все принимаемые имена, отсортированные по коду клавиши
    pub fn all() -> Vec<(&'static str, KeyCode)> {
        let mut names = KEY_NAMES.to_vec();
        names.sort_by_key(|&(_, code)| code);
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_key_mapping() {
        assert_eq!(KeyNames::lookup("a"), Some(KeyCode::A));
        assert_eq!(KeyNames::lookup("space"), Some(KeyCode::Space));
        assert_eq!(KeyNames::lookup("ctrl"), Some(KeyCode::LeftControl));
        assert_eq!(KeyNames::lookup(","), Some(KeyCode::Comma));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(KeyNames::lookup("A"), Some(KeyCode::A));
        assert_eq!(KeyNames::lookup("SPACE"), Some(KeyCode::Space));
        assert_eq!(KeyNames::lookup("Control"), Some(KeyCode::LeftControl));
    }

    #[test]
    fn test_aliases_share_canonical_name() {
        assert_eq!(KeyNames::lookup("esc"), KeyNames::lookup("escape"));
        assert_eq!(KeyNames::canonical_name(KeyCode::Escape), "escape");
        assert_eq!(KeyNames::canonical_name(KeyCode::LeftMeta), "super");
    }

    #[test]
    fn test_invalid_key() {
        assert!(KeyNames::lookup("invalid_key").is_none());
        assert!(KeyNames::lookup("").is_none());
    }

    #[test]
    fn test_every_code_has_a_name() {
        for (_, code) in KeyNames::all() {
            assert_ne!(KeyNames::canonical_name(code), "unknown");
            assert_eq!(KeyNames::lookup(KeyNames::canonical_name(code)), Some(code));
        }
    }
}
