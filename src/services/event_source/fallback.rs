use crate::error::{CaptureError, Result};
use std::sync::Arc;
use tracing::warn;

use super::r#trait::{CaptureTarget, EventSource};
use super::stream::EventStream;

/// Источник с запасным вариантом: если основной не может работать на этой
/// системе или не нашёл устройство, открывается запасной.
///
/// Остальные ошибки (нет прав, сбой) возвращаются как есть.
pub struct FallbackEventSource {
    primary: Arc<dyn EventSource>,
    fallback: Arc<dyn EventSource>,
}

impl FallbackEventSource {
    pub fn new(primary: Arc<dyn EventSource>, fallback: Arc<dyn EventSource>) -> Self {
        Self { primary, fallback }
    }

    fn should_fall_back(error: &CaptureError) -> bool {
        matches!(
            error,
            CaptureError::PlatformUnsupported(_) | CaptureError::DeviceNotFound(_)
        )
    }
}

#[async_trait::async_trait]
impl EventSource for FallbackEventSource {
    async fn open(&self, target: CaptureTarget) -> Result<EventStream> {
        match self.primary.open(target).await {
            Err(e) if Self::should_fall_back(&e) => {
                warn!(
                    "Источник {} недоступен ({}), переключаемся на {}",
                    self.primary.name(),
                    e,
                    self.fallback.name()
                );
                self.fallback.open(target).await
            }
            result => result,
        }
    }

    fn name(&self) -> &'static str {
        self.primary.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::KeyCode;
    use crate::services::event_source::{SyntheticEventSource, UnsupportedEventSource};

    #[tokio::test]
    async fn test_unsupported_primary_falls_back() {
        let (fallback, controller) = SyntheticEventSource::new();
        let source = FallbackEventSource::new(Arc::new(UnsupportedEventSource), Arc::new(fallback));

        let mut stream = source.open(CaptureTarget::new(Some(3), None)).await.unwrap();
        assert_eq!(controller.last_target(), Some(CaptureTarget::new(Some(3), None)));

        assert!(controller.press(KeyCode::A).await);
        assert_eq!(stream.next().await.unwrap().unwrap().key_code, KeyCode::A);
    }

    #[tokio::test]
    async fn test_missing_device_falls_back() {
        let (primary, _) = SyntheticEventSource::new();
        primary.fail_next_open(CaptureError::DeviceNotFound("/dev/input/event9".into()));
        let (fallback, controller) = SyntheticEventSource::new();
        let source = FallbackEventSource::new(Arc::new(primary), Arc::new(fallback));

        assert!(source.open(CaptureTarget::system_wide()).await.is_ok());
        assert!(controller.is_open());
    }

    #[tokio::test]
    async fn test_permission_error_is_not_masked() {
        let (primary, _) = SyntheticEventSource::new();
        primary.fail_next_open(CaptureError::PermissionDenied("input".into()));
        let (fallback, controller) = SyntheticEventSource::new();
        let source = FallbackEventSource::new(Arc::new(primary), Arc::new(fallback));

        let result = source.open(CaptureTarget::system_wide()).await;
        assert!(matches!(result, Err(CaptureError::PermissionDenied(_))));
        assert!(!controller.is_open());
    }

    #[tokio::test]
    async fn test_both_unavailable_reports_fallback_error() {
        let source = FallbackEventSource::new(
            Arc::new(UnsupportedEventSource),
            Arc::new(UnsupportedEventSource),
        );
        let result = source.open(CaptureTarget::system_wide()).await;
        assert!(matches!(result, Err(CaptureError::PlatformUnsupported(_))));
    }
}
