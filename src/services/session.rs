use crate::chord::Chord;
use crate::error::{CaptureError, Result};
use crate::events::KeybindId;
use crate::services::dispatcher::{self, Callbacks};
use crate::services::event_source::{CaptureTarget, EventSource, StreamCloser};
use crate::services::matcher::{Matcher, MatcherOptions, RepeatPolicy};
use crate::services::registry::Registry;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Состояние сессии захвата
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Starting,
    Running,
    Stopped,
}

/// Задачи активного захвата
struct ActiveCapture {
    closer: StreamCloser,
    matcher: JoinHandle<()>,
    dispatcher: JoinHandle<()>,
}

struct SessionState {
    status: SessionStatus,
    /// Меняется при каждом `start` и `stop`: запуск, чьё поколение устарело, отменён
    generation: u64,
    active: Option<ActiveCapture>,
}

/// Возвращает сессию из `Starting` в `Idle`, если запуск прерван до конца:
/// ошибка `open` или отброшенный future `start`.
struct StartingGuard {
    state: Arc<Mutex<SessionState>>,
    generation: u64,
    armed: bool,
}

impl StartingGuard {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for StartingGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock();
        if state.generation == self.generation && state.status == SessionStatus::Starting {
            state.status = SessionStatus::Idle;
            debug!("Запуск прерван до открытия источника, сессия возвращена в Idle");
        }
    }
}

/// Контроллер сессии: единственный активный захват на экземпляр.
///
/// Регистрация keybind'ов возможна в любом состоянии; до `start` она просто
/// заполняет таблицу, которая начинает работать с началом захвата.
pub struct KeybindSession {
    registry: Registry,
    source: Arc<dyn EventSource>,
    repeat_policy: RepeatPolicy,
    state: Arc<Mutex<SessionState>>,
}

impl KeybindSession {
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self::with_repeat_policy(source, RepeatPolicy::default())
    }

    pub fn with_repeat_policy(source: Arc<dyn EventSource>, repeat_policy: RepeatPolicy) -> Self {
        info!("Инициализация KeybindSession (источник: {})", source.name());
        Self {
            registry: Registry::new(),
            source,
            repeat_policy,
            state: Arc::new(Mutex::new(SessionState {
                status: SessionStatus::Idle,
                generation: 0,
                active: None,
            })),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.state.lock().status
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Начать захват; завершается, когда источник открыт (или не смог открыться)
    pub async fn start(
        &self,
        window_id: Option<u64>,
        display_id: Option<u64>,
        callback: impl Fn(KeybindId) + Send + Sync + 'static,
    ) -> Result<()> {
        self.start_with(CaptureTarget::new(window_id, display_id), Callbacks::new(callback))
            .await
    }

    pub async fn start_with(&self, target: CaptureTarget, callbacks: Callbacks) -> Result<()> {
        let generation = {
            let mut state = self.state.lock();
            match state.status {
                SessionStatus::Starting | SessionStatus::Running => {
                    warn!("Повторный запуск отклонён: сессия в состоянии {:?}", state.status);
                    return Err(CaptureError::AlreadyRunning);
                }
                SessionStatus::Idle | SessionStatus::Stopped => state.status = SessionStatus::Starting,
            }
            state.generation += 1;
            state.generation
        };
        let mut guard = StartingGuard {
            state: Arc::clone(&self.state),
            generation,
            armed: true,
        };

        info!("Открытие источника {} ({})", self.source.name(), target);
        let stream = match self.source.open(target).await {
            Ok(stream) => stream,
            Err(e) => {
                drop(guard);
                warn!("Не удалось открыть источник событий: {}", e);
                return Err(e);
            }
        };

        let options = MatcherOptions {
            repeat_policy: self.repeat_policy,
            report_releases: callbacks.wants_releases(),
        };

        // Задачи создаются под блокировкой, чтобы фатальная ошибка источника
        // не могла перевести сессию в Stopped раньше, чем в Running
        let mut state = self.state.lock();
        guard.disarm();
        if state.generation != generation || state.status != SessionStatus::Starting {
            stream.close();
            info!("Запуск отменён: сессия остановлена во время открытия источника");
            return Err(CaptureError::Cancelled);
        }

        let closer = stream.closer();
        let (dispatch, dispatcher) = dispatcher::spawn(callbacks);
        let matcher = Matcher::new(self.registry.clone(), options);
        let shared_state = Arc::clone(&self.state);
        let matcher = tokio::spawn(async move {
            if let Err(e) = matcher.run(stream, dispatch.clone()).await {
                {
                    let mut state = shared_state.lock();
                    if state.generation == generation && state.status == SessionStatus::Running {
                        state.status = SessionStatus::Stopped;
                        state.active = None;
                    }
                }
                warn!("Сессия захвата остановлена из-за ошибки источника");
                dispatch.terminated(e);
            }
        });

        state.status = SessionStatus::Running;
        state.active = Some(ActiveCapture {
            closer,
            matcher,
            dispatcher,
        });
        info!("Захват запущен, зарегистрировано keybind'ов: {}", self.registry.len());
        Ok(())
    }

    /// Разобрать описание сочетания и привязать к нему `id`
    pub fn register_keybind(&self, spec: &str, id: KeybindId) -> Result<()> {
        let chord = Chord::parse(spec)?;
        self.register_chord(id, chord);
        Ok(())
    }

    pub fn register_chord(&self, id: KeybindId, chord: Chord) {
        if let Some(previous) = self.registry.register(id, chord) {
            debug!("Keybind {} перепривязан: {} -> {}", id, previous, chord);
        }
    }

    pub fn unregister_keybind(&self, id: KeybindId) {
        self.registry.unregister(id);
    }

    /// Остановить захват: закрыть поток и дождаться завершения задач.
    /// Повторный вызов ничего не делает.
    pub async fn stop(&self) -> Result<()> {
        let active = {
            let mut state = self.state.lock();
            if matches!(state.status, SessionStatus::Starting | SessionStatus::Running) {
                state.status = SessionStatus::Stopped;
                state.generation += 1;
            }
            state.active.take()
        };

        let Some(active) = active else {
            debug!("Остановка: активного захвата нет");
            return Ok(());
        };

        info!("Остановка захвата...");
        active.closer.close();
        active
            .matcher
            .await
            .map_err(|e| CaptureError::Internal(format!("цикл сопоставления: {}", e)))?;
        active
            .dispatcher
            .await
            .map_err(|e| CaptureError::Internal(format!("диспетчер: {}", e)))?;
        info!("Захват остановлен");
        Ok(())
    }
}

impl Drop for KeybindSession {
    fn drop(&mut self) {
        if let Some(active) = self.state.lock().active.take() {
            info!("Закрытие активного захвата при уничтожении сессии");
            active.closer.close();
        }
    }
}
