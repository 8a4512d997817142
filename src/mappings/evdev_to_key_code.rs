use crate::events::{KeyCode, KeyState};
use evdev::KeyCode as EvKey;

/// Преобразование evdev кодов в платформенно-независимые `KeyCode`.
/// Отвечает только за трансляцию; клавиши вне таблицы игнорируются источником.
pub struct EvdevToKeyCode;

impl EvdevToKeyCode {
    pub fn translate(key: EvKey) -> Option<KeyCode> {
        let code = match key {
            // Буквенные клавиши
            EvKey::KEY_A => KeyCode::A,
            EvKey::KEY_B => KeyCode::B,
            EvKey::KEY_C => KeyCode::C,
            EvKey::KEY_D => KeyCode::D,
            EvKey::KEY_E => KeyCode::E,
            EvKey::KEY_F => KeyCode::F,
            EvKey::KEY_G => KeyCode::G,
            EvKey::KEY_H => KeyCode::H,
            EvKey::KEY_I => KeyCode::I,
            EvKey::KEY_J => KeyCode::J,
            EvKey::KEY_K => KeyCode::K,
            EvKey::KEY_L => KeyCode::L,
            EvKey::KEY_M => KeyCode::M,
            EvKey::KEY_N => KeyCode::N,
            EvKey::KEY_O => KeyCode::O,
            EvKey::KEY_P => KeyCode::P,
            EvKey::KEY_Q => KeyCode::Q,
            EvKey::KEY_R => KeyCode::R,
            EvKey::KEY_S => KeyCode::S,
            EvKey::KEY_T => KeyCode::T,
            EvKey::KEY_U => KeyCode::U,
            EvKey::KEY_V => KeyCode::V,
            EvKey::KEY_W => KeyCode::W,
            EvKey::KEY_X => KeyCode::X,
            EvKey::KEY_Y => KeyCode::Y,
            EvKey::KEY_Z => KeyCode::Z,

            // Цифровые клавиши (верхний ряд)
            EvKey::KEY_1 => KeyCode::Digit1,
            EvKey::KEY_2 => KeyCode::Digit2,
            EvKey::KEY_3 => KeyCode::Digit3,
            EvKey::KEY_4 => KeyCode::Digit4,
            EvKey::KEY_5 => KeyCode::Digit5,
            EvKey::KEY_6 => KeyCode::Digit6,
            EvKey::KEY_7 => KeyCode::Digit7,
            EvKey::KEY_8 => KeyCode::Digit8,
            EvKey::KEY_9 => KeyCode::Digit9,
            EvKey::KEY_0 => KeyCode::Digit0,

            // Функциональные клавиши
            EvKey::KEY_F1 => KeyCode::F1,
            EvKey::KEY_F2 => KeyCode::F2,
            EvKey::KEY_F3 => KeyCode::F3,
            EvKey::KEY_F4 => KeyCode::F4,
            EvKey::KEY_F5 => KeyCode::F5,
            EvKey::KEY_F6 => KeyCode::F6,
            EvKey::KEY_F7 => KeyCode::F7,
            EvKey::KEY_F8 => KeyCode::F8,
            EvKey::KEY_F9 => KeyCode::F9,
            EvKey::KEY_F10 => KeyCode::F10,
            EvKey::KEY_F11 => KeyCode::F11,
            EvKey::KEY_F12 => KeyCode::F12,
            EvKey::KEY_F13 => KeyCode::F13,
            EvKey::KEY_F14 => KeyCode::F14,
            EvKey::KEY_F15 => KeyCode::F15,
            EvKey::KEY_F16 => KeyCode::F16,
            EvKey::KEY_F17 => KeyCode::F17,
            EvKey::KEY_F18 => KeyCode::F18,
            EvKey::KEY_F19 => KeyCode::F19,
            EvKey::KEY_F20 => KeyCode::F20,
            EvKey::KEY_F21 => KeyCode::F21,
            EvKey::KEY_F22 => KeyCode::F22,
            EvKey::KEY_F23 => KeyCode::F23,
            EvKey::KEY_F24 => KeyCode::F24,

            // Специальные клавиши
            EvKey::KEY_ESC => KeyCode::Escape,
            EvKey::KEY_ENTER => KeyCode::Enter,
            EvKey::KEY_TAB => KeyCode::Tab,
            EvKey::KEY_SPACE => KeyCode::Space,
            EvKey::KEY_BACKSPACE => KeyCode::Backspace,
            EvKey::KEY_DELETE => KeyCode::Delete,
            EvKey::KEY_INSERT => KeyCode::Insert,

            // Навигация
            EvKey::KEY_HOME => KeyCode::Home,
            EvKey::KEY_END => KeyCode::End,
            EvKey::KEY_PAGEUP => KeyCode::PageUp,
            EvKey::KEY_PAGEDOWN => KeyCode::PageDown,
            EvKey::KEY_UP => KeyCode::Up,
            EvKey::KEY_DOWN => KeyCode::Down,
            EvKey::KEY_LEFT => KeyCode::Left,
            EvKey::KEY_RIGHT => KeyCode::Right,

            // Знаки пунктуации
            EvKey::KEY_MINUS => KeyCode::Minus,
            EvKey::KEY_EQUAL => KeyCode::Equal,
            EvKey::KEY_LEFTBRACE => KeyCode::LeftBracket,
            EvKey::KEY_RIGHTBRACE => KeyCode::RightBracket,
            EvKey::KEY_BACKSLASH => KeyCode::Backslash,
            EvKey::KEY_SEMICOLON => KeyCode::Semicolon,
            EvKey::KEY_APOSTROPHE => KeyCode::Apostrophe,
            EvKey::KEY_GRAVE => KeyCode::Grave,
            EvKey::KEY_COMMA => KeyCode::Comma,
            EvKey::KEY_DOT => KeyCode::Period,
            EvKey::KEY_SLASH => KeyCode::Slash,

            // Системные клавиши
            EvKey::KEY_CAPSLOCK => KeyCode::CapsLock,
            EvKey::KEY_NUMLOCK => KeyCode::NumLock,
            EvKey::KEY_SCROLLLOCK => KeyCode::ScrollLock,
            EvKey::KEY_SYSRQ => KeyCode::PrintScreen,
            EvKey::KEY_PAUSE => KeyCode::Pause,
            EvKey::KEY_COMPOSE => KeyCode::Menu,

            // Цифровой блок
            EvKey::KEY_KP0 => KeyCode::Numpad0,
            EvKey::KEY_KP1 => KeyCode::Numpad1,
            EvKey::KEY_KP2 => KeyCode::Numpad2,
            EvKey::KEY_KP3 => KeyCode::Numpad3,
            EvKey::KEY_KP4 => KeyCode::Numpad4,
            EvKey::KEY_KP5 => KeyCode::Numpad5,
            EvKey::KEY_KP6 => KeyCode::Numpad6,
            EvKey::KEY_KP7 => KeyCode::Numpad7,
            EvKey::KEY_KP8 => KeyCode::Numpad8,
            EvKey::KEY_KP9 => KeyCode::Numpad9,
            EvKey::KEY_KPPLUS => KeyCode::NumpadAdd,
            EvKey::KEY_KPMINUS => KeyCode::NumpadSubtract,
            EvKey::KEY_KPASTERISK => KeyCode::NumpadMultiply,
            EvKey::KEY_KPSLASH => KeyCode::NumpadDivide,
            EvKey::KEY_KPDOT => KeyCode::NumpadDecimal,
            EvKey::KEY_KPENTER => KeyCode::NumpadEnter,

            // Мультимедиа
            EvKey::KEY_VOLUMEUP => KeyCode::VolumeUp,
            EvKey::KEY_VOLUMEDOWN => KeyCode::VolumeDown,
            EvKey::KEY_MUTE => KeyCode::VolumeMute,
            EvKey::KEY_PLAYPAUSE => KeyCode::MediaPlayPause,
            EvKey::KEY_NEXTSONG => KeyCode::MediaNext,
            EvKey::KEY_PREVIOUSSONG => KeyCode::MediaPrevious,
            EvKey::KEY_STOPCD => KeyCode::MediaStop,

            // Модификаторы (левые и правые)
            EvKey::KEY_LEFTCTRL => KeyCode::LeftControl,
            EvKey::KEY_RIGHTCTRL => KeyCode::RightControl,
            EvKey::KEY_LEFTSHIFT => KeyCode::LeftShift,
            EvKey::KEY_RIGHTSHIFT => KeyCode::RightShift,
            EvKey::KEY_LEFTALT => KeyCode::LeftAlt,
            EvKey::KEY_RIGHTALT => KeyCode::RightAlt,
            EvKey::KEY_LEFTMETA => KeyCode::LeftMeta,
            EvKey::KEY_RIGHTMETA => KeyCode::RightMeta,
            _ => return None,
        };
        Some(code)
    }

    /// Значение события EV_KEY: 0 - отпускание, 1 - нажатие, 2 - автоповтор
    pub fn translate_state(value: i32) -> Option<KeyState> {
        match value {
            0 => Some(KeyState::Released),
            1 => Some(KeyState::Pressed),
            2 => Some(KeyState::Repeat),
            _ => None,
        }
    }
}
