use crate::error::CaptureError;
use crate::events::{KeybindId, KeybindTrigger};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

pub type KeybindCallback = Arc<dyn Fn(KeybindId) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&CaptureError) + Send + Sync>;

/// Обработчики, которым доставляются срабатывания сессии
#[derive(Clone)]
pub struct Callbacks {
    on_pressed: KeybindCallback,
    on_released: Option<KeybindCallback>,
    on_error: Option<ErrorCallback>,
}

impl Callbacks {
    pub fn new(on_pressed: impl Fn(KeybindId) + Send + Sync + 'static) -> Self {
        Self {
            on_pressed: Arc::new(on_pressed),
            on_released: None,
            on_error: None,
        }
    }

    /// Вызывается при отпускании клавиши сработавшего сочетания
    pub fn on_released(mut self, callback: impl Fn(KeybindId) + Send + Sync + 'static) -> Self {
        self.on_released = Some(Arc::new(callback));
        self
    }

    /// Вызывается один раз, если сессия остановилась из-за ошибки источника
    pub fn on_error(mut self, callback: impl Fn(&CaptureError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }

    pub fn wants_releases(&self) -> bool {
        self.on_released.is_some()
    }

    fn deliver(&self, delivery: Delivery) {
        match delivery {
            Delivery::Trigger(KeybindTrigger::Pressed(id)) => (self.on_pressed)(id),
            Delivery::Trigger(KeybindTrigger::Released(id)) => {
                if let Some(on_released) = &self.on_released {
                    on_released(id);
                }
            }
            Delivery::Terminated(error) => {
                if let Some(on_error) = &self.on_error {
                    on_error(&error);
                }
            }
        }
    }
}

#[derive(Debug)]
enum Delivery {
    Trigger(KeybindTrigger),
    Terminated(CaptureError),
}

/// Очередь доставки: отправка никогда не блокирует цикл сопоставления
#[derive(Debug, Clone)]
pub struct DispatchSender {
    tx: mpsc::UnboundedSender<Delivery>,
}

impl DispatchSender {
    pub fn trigger(&self, trigger: KeybindTrigger) {
        if self.tx.send(Delivery::Trigger(trigger)).is_err() {
            debug!("Доставка {:?} пропущена: диспетчер остановлен", trigger);
        }
    }

    pub fn terminated(&self, error: CaptureError) {
        if let Err(e) = self.tx.send(Delivery::Terminated(error)) {
            error!("Не удалось доставить ошибку сессии: {:?}", e.0);
        }
    }
}

/// Запустить задачу доставки.
///
/// Обработчики выполняются на blocking-пуле строго по одному и в порядке
/// поступления. Паника обработчика логируется и не останавливает доставку.
/// Задача завершается, когда отброшены все `DispatchSender`.
pub fn spawn(callbacks: Callbacks) -> (DispatchSender, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Delivery>();

    let handle = tokio::spawn(async move {
        let mut delivered: u64 = 0;
        while let Some(delivery) = rx.recv().await {
            let callbacks = callbacks.clone();
            let description = format!("{:?}", delivery);
            match tokio::task::spawn_blocking(move || callbacks.deliver(delivery)).await {
                Ok(()) => delivered += 1,
                Err(e) if e.is_panic() => error!("Обработчик паниковал при доставке {}", description),
                Err(e) => error!("Доставка {} прервана: {}", description, e),
            }
        }
        info!("Диспетчер остановлен, доставлено срабатываний: {}", delivered);
    });

    (DispatchSender { tx }, handle)
}
