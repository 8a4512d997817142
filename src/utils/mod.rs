#[cfg(target_os = "linux")]
pub mod device_finder;
#[cfg(target_os = "linux")]
pub mod permissions;

#[cfg(target_os = "linux")]
pub use device_finder::DeviceFinder;

// ✅ Макросы условного логирования для горячего пути (каждое событие клавиатуры)
#[macro_export]
macro_rules! debug_if_enabled {
    ($($arg:tt)*) => {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! trace_if_enabled {
    ($($arg:tt)*) => {
        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!($($arg)*);
        }
    };
}
