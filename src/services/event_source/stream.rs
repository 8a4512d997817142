use crate::error::{CaptureError, Result};
use crate::events::RawKeyEvent;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

/// Ёмкость буфера между источником и циклом сопоставления
pub const EVENT_BUFFER: usize = 256;

#[derive(Debug, Default)]
struct CloseSignal {
    closed: AtomicBool,
    notify: Notify,
}

/// Дескриптор закрытия потока событий.
///
/// `close()` можно вызывать из любого потока, повторный вызов ничего не делает.
#[derive(Debug, Clone, Default)]
pub struct StreamCloser {
    signal: Arc<CloseSignal>,
}

impl StreamCloser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn close(&self) {
        if !self.signal.closed.swap(true, Ordering::SeqCst) {
            self.signal.notify.notify_waiters();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.signal.closed.load(Ordering::SeqCst)
    }

    /// Дождаться закрытия
    pub async fn closed(&self) {
        loop {
            let notified = self.signal.notify.notified();
            if self.is_closed() {
                return;
            }
            notified.await;
        }
    }
}

/// Сторона производителя: через неё источник отдаёт события в поток
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<Result<RawKeyEvent>>,
    closer: StreamCloser,
}

impl EventSink {
    /// Отправить событие; false означает, что поток закрыт и производитель должен завершиться
    pub async fn send(&self, event: RawKeyEvent) -> bool {
        if self.closer.is_closed() {
            return false;
        }
        self.tx.send(Ok(event)).await.is_ok()
    }

    /// Сообщить о фатальной ошибке источника
    pub async fn fail(&self, error: CaptureError) -> bool {
        if self.closer.is_closed() {
            return false;
        }
        self.tx.send(Err(error)).await.is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.closer.is_closed() || self.tx.is_closed()
    }

    pub fn closer(&self) -> StreamCloser {
        self.closer.clone()
    }
}

/// Упорядоченный, неперезапускаемый поток сырых событий клавиатуры.
///
/// Завершается после `close()`, когда все `EventSink` отброшены, либо отдаёт
/// `Err` при фатальной ошибке платформы.
#[derive(Debug)]
pub struct EventStream {
    events: mpsc::Receiver<Result<RawKeyEvent>>,
    closer: StreamCloser,
}

impl EventStream {
    pub fn channel(capacity: usize) -> (EventSink, EventStream) {
        let (tx, events) = mpsc::channel(capacity);
        let closer = StreamCloser::new();
        (
            EventSink {
                tx,
                closer: closer.clone(),
            },
            EventStream { events, closer },
        )
    }

    pub async fn next(&mut self) -> Option<Result<RawKeyEvent>> {
        if self.closer.is_closed() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.closer.closed() => None,
            item = self.events.recv() => item,
        }
    }

    pub fn closer(&self) -> StreamCloser {
        self.closer.clone()
    }

    pub fn close(&self) {
        self.closer.close();
    }
}

// Отброшенный поток (в том числе после фатальной ошибки) останавливает всех производителей
impl Drop for EventStream {
    fn drop(&mut self) {
        self.closer.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{KeyCode, Modifiers};
    use std::time::Duration;

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (sink, mut stream) = EventStream::channel(8);
        for key in [KeyCode::A, KeyCode::B, KeyCode::C] {
            assert!(sink.send(RawKeyEvent::press(key, Modifiers::new())).await);
        }
        drop(sink);

        let mut keys = Vec::new();
        while let Some(item) = stream.next().await {
            keys.push(item.unwrap().key_code);
        }
        assert_eq!(keys, vec![KeyCode::A, KeyCode::B, KeyCode::C]);
    }

    #[tokio::test]
    async fn test_close_from_another_thread_ends_stream() {
        let (sink, mut stream) = EventStream::channel(8);
        let closer = stream.closer();

        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            closer.close();
        });

        let result = tokio::time::timeout(Duration::from_secs(2), stream.next()).await;
        assert!(matches!(result, Ok(None)));
        assert!(sink.is_closed());
        assert!(!sink.send(RawKeyEvent::press(KeyCode::A, Modifiers::new())).await);
    }

    #[tokio::test]
    async fn test_fail_surfaces_error() {
        let (sink, mut stream) = EventStream::channel(8);
        assert!(sink.fail(CaptureError::SourceFailed("gone".into())).await);
        assert!(matches!(stream.next().await, Some(Err(CaptureError::SourceFailed(_)))));
    }

    #[tokio::test]
    async fn test_dropping_stream_after_error_stops_other_producers() {
        let (failing, mut stream) = EventStream::channel(8);
        let idle = failing.clone();

        // Второе устройство молчит и ждёт только закрытия потока
        let producer = tokio::spawn(async move {
            idle.closer().closed().await;
            idle.is_closed()
        });

        assert!(failing.fail(CaptureError::SourceFailed("unplugged".into())).await);
        assert!(matches!(stream.next().await, Some(Err(_))));
        drop(stream);

        let finished = tokio::time::timeout(Duration::from_secs(2), producer).await;
        assert!(matches!(finished, Ok(Ok(true))));
        assert!(failing.is_closed());
    }

    #[test]
    fn test_close_is_idempotent() {
        let closer = StreamCloser::new();
        closer.close();
        closer.close();
        assert!(closer.is_closed());
    }
}
