pub mod keyboard;

pub use keyboard::{KeyCode, KeyState, KeybindId, KeybindTrigger, ModifierKey, Modifiers, RawKeyEvent};
