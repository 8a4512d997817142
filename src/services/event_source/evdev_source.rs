use crate::capture_error;
use crate::debug_if_enabled;
use crate::error::{CaptureError, Result};
use crate::events::RawKeyEvent;
use crate::mappings::EvdevToKeyCode;
use crate::services::modifier_state::ModifierState;
use crate::trace_if_enabled;
use crate::utils::{permissions, DeviceFinder};
use evdev::{Device, EventType, InputEvent};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use super::r#trait::{CaptureTarget, EventSource};
use super::stream::{EventSink, EventStream, EVENT_BUFFER};

/// Источник событий на базе evdev (`/dev/input/event*`).
///
/// evdev не знает об окнах: захват всегда системный, идентификаторы окна и
/// дисплея только попадают в лог.
pub struct EvdevEventSource {
    device_path: String,
}

impl EvdevEventSource {
    pub fn new(device_path: impl Into<String>) -> Self {
        Self {
            device_path: device_path.into(),
        }
    }

    fn open_device(path: &Path) -> Result<(Device, String)> {
        let device = Device::open(path)
            .map_err(|e| CaptureError::from_open_error(&path.display().to_string(), e))?;
        let name = device.name().unwrap_or("Unknown").to_string();
        Ok((device, name))
    }

    async fn read_device(
        path: PathBuf,
        device_name: String,
        mut events: evdev::EventStream,
        sink: EventSink,
    ) {
        let closer = sink.closer();
        let mut modifier_state = ModifierState::new();

        loop {
            let event = tokio::select! {
                _ = closer.closed() => break,
                event = events.next_event() => event,
            };

            match event {
                Ok(event) => {
                    let Some(raw) = Self::translate(&event, &mut modifier_state, &device_name) else {
                        continue;
                    };
                    trace_if_enabled!("Событие клавиши: {}", raw);
                    if !sink.send(raw).await {
                        break;
                    }
                }
                Err(e) => {
                    error!("Ошибка чтения устройства {}: {}", path.display(), e);
                    sink.fail(capture_error!(
                        source_failed,
                        "устройство {} ({}) недоступно: {}",
                        device_name,
                        path.display(),
                        e
                    ))
                    .await;
                    break;
                }
            }
        }

        debug_if_enabled!("Чтение устройства {} завершено", path.display());
    }

    fn translate(
        event: &InputEvent,
        modifier_state: &mut ModifierState,
        device_name: &str,
    ) -> Option<RawKeyEvent> {
        if event.event_type() != EventType::KEY {
            return None;
        }
        let key_code = EvdevToKeyCode::translate(evdev::KeyCode::new(event.code()))?;
        let Some(state) = EvdevToKeyCode::translate_state(event.value()) else {
            debug_if_enabled!("Неизвестное значение события: {}", event.value());
            return None;
        };

        modifier_state.update_key(key_code, state);
        Some(RawKeyEvent::new(
            key_code,
            state,
            modifier_state.to_modifiers(),
            device_name,
        ))
    }
}

#[async_trait::async_trait]
impl EventSource for EvdevEventSource {
    async fn open(&self, target: CaptureTarget) -> Result<EventStream> {
        if !target.is_system_wide() {
            info!(
                "evdev захватывает клавиатуру глобально, привязка к окну не применяется ({})",
                target
            );
        }

        permissions::check_input_devices_access()?;
        permissions::check_not_root();

        let paths = DeviceFinder::find_keyboard_devices(&self.device_path)?;
        let (sink, stream) = EventStream::channel(EVENT_BUFFER);

        let mut opened = Vec::with_capacity(paths.len());
        for path in paths {
            let (device, name) = Self::open_device(&path)?;
            let events = device.into_event_stream().map_err(|e| {
                capture_error!(
                    source_failed,
                    "не удалось создать поток событий для {}: {}",
                    path.display(),
                    e
                )
            })?;
            opened.push((path, name, events));
        }

        for (path, name, events) in opened {
            info!("Захват клавиатуры: {} ({})", name, path.display());
            tokio::spawn(Self::read_device(path, name, events, sink.clone()));
        }

        Ok(stream)
    }

    fn name(&self) -> &'static str {
        "evdev"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{KeyCode, KeyState};

    fn key_event(code: evdev::KeyCode, value: i32) -> InputEvent {
        InputEvent::new(EventType::KEY.0, code.code(), value)
    }

    #[test]
    fn test_translate_tracks_modifiers() {
        let mut state = ModifierState::new();
        let ctrl = EvdevEventSource::translate(
            &key_event(evdev::KeyCode::KEY_LEFTCTRL, 1),
            &mut state,
            "kbd",
        )
        .unwrap();
        assert_eq!(ctrl.key_code, KeyCode::LeftControl);

        let k = EvdevEventSource::translate(&key_event(evdev::KeyCode::KEY_K, 2), &mut state, "kbd")
            .unwrap();
        assert_eq!(k.key_code, KeyCode::K);
        assert_eq!(k.state, KeyState::Repeat);
        assert!(k.modifiers.ctrl);
        assert_eq!(k.device_name, "kbd");
    }

    #[test]
    fn test_translate_skips_non_key_events() {
        let mut state = ModifierState::new();
        let sync = InputEvent::new(EventType::SYNCHRONIZATION.0, 0, 0);
        assert!(EvdevEventSource::translate(&sync, &mut state, "kbd").is_none());

        let mouse = key_event(evdev::KeyCode::BTN_LEFT, 1);
        assert!(EvdevEventSource::translate(&mouse, &mut state, "kbd").is_none());
    }
}
