#[cfg(target_os = "linux")]
pub mod evdev_source;
pub mod fallback;
pub mod stream;
pub mod synthetic;
pub mod unsupported;
mod r#trait;

pub use self::r#trait::{create_event_source, CaptureTarget, EventSource};
pub use fallback::FallbackEventSource;
pub use stream::{EventSink, EventStream, StreamCloser};
pub use synthetic::{SyntheticController, SyntheticEventSource};
pub use unsupported::UnsupportedEventSource;
