use crate::capture_error;
use crate::error::Result;

use super::r#trait::{CaptureTarget, EventSource};
use super::stream::EventStream;

/// Источник для платформ без реализации захвата
#[derive(Debug, Default)]
pub struct UnsupportedEventSource;

#[async_trait::async_trait]
impl EventSource for UnsupportedEventSource {
    async fn open(&self, target: CaptureTarget) -> Result<EventStream> {
        Err(capture_error!(
            unsupported,
            "захват клавиатуры ({}) не реализован для {}",
            target,
            std::env::consts::OS
        ))
    }

    fn name(&self) -> &'static str {
        "unsupported"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptureError;

    #[tokio::test]
    async fn test_open_fails_with_platform_unsupported() {
        let result = UnsupportedEventSource.open(CaptureTarget::system_wide()).await;
        assert!(matches!(result, Err(CaptureError::PlatformUnsupported(_))));
    }
}
