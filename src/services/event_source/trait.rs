use crate::config::CaptureConfig;
use crate::error::Result;
use std::fmt;
use std::sync::Arc;

use super::stream::EventStream;

#[cfg(target_os = "linux")]
const AUTO_DEVICE: &str = "auto";

/// Window/display context a capture session is bound to.
///
/// Both handles absent means system-wide capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureTarget {
    pub window_id: Option<u64>,
    pub display_id: Option<u64>,
}

impl CaptureTarget {
    pub fn new(window_id: Option<u64>, display_id: Option<u64>) -> Self {
        Self {
            window_id,
            display_id,
        }
    }

    pub fn system_wide() -> Self {
        Self::default()
    }

    pub fn is_system_wide(&self) -> bool {
        self.window_id.is_none() && self.display_id.is_none()
    }
}

impl fmt::Display for CaptureTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_system_wide() {
            return write!(f, "system-wide");
        }
        write!(f, "window={:?} display={:?}", self.window_id, self.display_id)
    }
}

/// Trait for platform keyboard event sources
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    /// Open the source for the given target.
    ///
    /// Resolves once the platform reports the stream as opened or failed.
    async fn open(&self, target: CaptureTarget) -> Result<EventStream>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Factory function to create the event source for the current platform.
///
/// On Linux an explicitly configured device that is missing falls back to
/// autodetecting all keyboards.
pub fn create_event_source(config: &CaptureConfig) -> Arc<dyn EventSource> {
    #[cfg(target_os = "linux")]
    {
        use super::evdev_source::EvdevEventSource;

        let autodetect: Arc<dyn EventSource> = Arc::new(EvdevEventSource::new(AUTO_DEVICE));
        if config.device_path == AUTO_DEVICE {
            return autodetect;
        }
        let configured = Arc::new(EvdevEventSource::new(config.device_path.clone()));
        Arc::new(super::fallback::FallbackEventSource::new(configured, autodetect))
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = config;
        Arc::new(super::unsupported::UnsupportedEventSource)
    }
}
