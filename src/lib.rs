//! Захват глобальных сочетаний клавиш.
//!
//! Основной тип - [`KeybindSession`]: таблица keybind'ов, источник событий
//! платформы и цикл сопоставления. Функции верхнего уровня работают с одной
//! сессией на процесс, созданной при первом обращении.

pub mod chord;
pub mod config;
pub mod error;
pub mod events;
pub mod mappings;
pub mod services;
pub mod utils;

use once_cell::sync::Lazy;

pub use chord::Chord;
pub use config::{CaptureConfig, Config};
pub use error::{CaptureError, Result};
pub use events::{KeyCode, KeyState, KeybindId, KeybindTrigger, ModifierKey, Modifiers, RawKeyEvent};
pub use services::{
    create_event_source, Callbacks, CaptureTarget, EventSource, KeybindSession, RepeatPolicy,
    SessionStatus,
};

static GLOBAL_SESSION: Lazy<KeybindSession> =
    Lazy::new(|| KeybindSession::new(create_event_source(&CaptureConfig::default())));

/// Сессия процесса, которой пользуются функции ниже
pub fn global_session() -> &'static KeybindSession {
    &GLOBAL_SESSION
}

/// Начать захват в сессии процесса
pub async fn start_keybinds(
    window_id: Option<u64>,
    display_id: Option<u64>,
    callback: impl Fn(KeybindId) + Send + Sync + 'static,
) -> Result<()> {
    global_session().start(window_id, display_id, callback).await
}

pub fn register_keybind(spec: &str, id: KeybindId) -> Result<()> {
    global_session().register_keybind(spec, id)
}

pub fn unregister_keybind(id: KeybindId) {
    global_session().unregister_keybind(id)
}

pub async fn stop_keybinds() -> Result<()> {
    global_session().stop().await
}
