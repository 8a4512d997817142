use crate::chord::Chord;
use crate::error::{CaptureError, Result};
use crate::events::{KeyCode, KeyState, RawKeyEvent};
use crate::services::modifier_state::ModifierState;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

use super::r#trait::{CaptureTarget, EventSource};
use super::stream::{EventSink, EventStream, EVENT_BUFFER};

const DEVICE_NAME: &str = "synthetic";

#[derive(Default)]
struct Shared {
    sink: Mutex<Option<EventSink>>,
    open_error: Mutex<Option<CaptureError>>,
    modifier_state: Mutex<ModifierState>,
    last_target: Mutex<Option<CaptureTarget>>,
}

/// Программируемый источник событий для тестов и режима `--dry-run`.
///
/// События подаются через парный `SyntheticController`.
pub struct SyntheticEventSource {
    shared: Arc<Shared>,
}

/// Управление синтетическим источником: подача нажатий и ошибок
#[derive(Clone)]
pub struct SyntheticController {
    shared: Arc<Shared>,
}

impl SyntheticEventSource {
    pub fn new() -> (Self, SyntheticController) {
        let shared = Arc::new(Shared::default());
        (
            Self {
                shared: Arc::clone(&shared),
            },
            SyntheticController { shared },
        )
    }

    /// Следующий вызов `open` завершится этой ошибкой
    pub fn fail_next_open(&self, error: CaptureError) {
        *self.shared.open_error.lock() = Some(error);
    }
}

#[async_trait::async_trait]
impl EventSource for SyntheticEventSource {
    async fn open(&self, target: CaptureTarget) -> Result<EventStream> {
        if let Some(error) = self.shared.open_error.lock().take() {
            return Err(error);
        }

        let (sink, stream) = EventStream::channel(EVENT_BUFFER);
        *self.shared.sink.lock() = Some(sink);
        *self.shared.last_target.lock() = Some(target);
        self.shared.modifier_state.lock().reset();
        info!("Синтетический источник открыт ({})", target);
        Ok(stream)
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}

impl SyntheticController {
    /// Открыт ли источник и не закрыт ли его поток
    pub fn is_open(&self) -> bool {
        self.current_sink().is_some_and(|sink| !sink.is_closed())
    }

    pub fn last_target(&self) -> Option<CaptureTarget> {
        *self.shared.last_target.lock()
    }

    fn current_sink(&self) -> Option<EventSink> {
        self.shared.sink.lock().clone()
    }

    /// Подать событие; модификаторы заполняются по ранее поданным событиям
    pub async fn send(&self, key_code: KeyCode, state: KeyState) -> bool {
        let Some(sink) = self.current_sink() else {
            return false;
        };
        let modifiers = {
            let mut modifier_state = self.shared.modifier_state.lock();
            modifier_state.update_key(key_code, state);
            modifier_state.to_modifiers()
        };
        sink.send(RawKeyEvent::new(key_code, state, modifiers, DEVICE_NAME))
            .await
    }

    pub async fn press(&self, key_code: KeyCode) -> bool {
        self.send(key_code, KeyState::Pressed).await
    }

    pub async fn release(&self, key_code: KeyCode) -> bool {
        self.send(key_code, KeyState::Released).await
    }

    pub async fn repeat(&self, key_code: KeyCode) -> bool {
        self.send(key_code, KeyState::Repeat).await
    }

    /// Нажать и отпустить сочетание целиком: модификаторы, клавиша, отпускание в обратном порядке
    pub async fn tap(&self, chord: &Chord) -> bool {
        let modifier_keys: Vec<KeyCode> = chord.modifiers().iter().map(|m| m.left_key()).collect();

        for key in &modifier_keys {
            if !self.press(*key).await {
                return false;
            }
        }
        if !self.press(chord.key()).await || !self.release(chord.key()).await {
            return false;
        }
        for key in modifier_keys.iter().rev() {
            if !self.release(*key).await {
                return false;
            }
        }
        true
    }

    /// Сымитировать фатальную ошибку платформы
    pub async fn fail(&self, error: CaptureError) -> bool {
        match self.current_sink() {
            Some(sink) => sink.fail(error).await,
            None => false,
        }
    }
}
