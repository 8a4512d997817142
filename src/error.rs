use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Некорректное описание сочетания '{spec}': {reason}")]
    InvalidChordSpec { spec: String, reason: String },

    #[error("Сессия захвата уже запущена")]
    AlreadyRunning,

    #[error("Платформа не поддерживается: {0}")]
    PlatformUnsupported(String),

    #[error("Недостаточно прав доступа: {0}")]
    PermissionDenied(String),

    #[error("Устройство не найдено: {0}")]
    DeviceNotFound(String),

    #[error("Источник событий завершился с ошибкой: {0}")]
    SourceFailed(String),

    #[error("Запуск захвата отменён вызовом stop")]
    Cancelled,

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl CaptureError {
    pub fn invalid_chord(spec: &str, reason: impl Into<String>) -> Self {
        CaptureError::InvalidChordSpec {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }

    pub fn device_not_found<T>(msg: impl Into<String>) -> Result<T> {
        Err(CaptureError::DeviceNotFound(msg.into()))
    }

    /// Ошибка открытия устройства с учётом вида ошибки ОС
    pub fn from_open_error(what: &str, e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied => {
                CaptureError::PermissionDenied(format!("{}: {}", what, e))
            }
            std::io::ErrorKind::NotFound => CaptureError::DeviceNotFound(format!("{}: {}", what, e)),
            _ => CaptureError::Io(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, CaptureError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! capture_error {
    (unsupported, $($arg:tt)*) => {
        $crate::error::CaptureError::PlatformUnsupported(format!($($arg)*))
    };
    (device_not_found, $($arg:tt)*) => {
        $crate::error::CaptureError::DeviceNotFound(format!($($arg)*))
    };
    (permission, $($arg:tt)*) => {
        $crate::error::CaptureError::PermissionDenied(format!($($arg)*))
    };
    (source_failed, $($arg:tt)*) => {
        $crate::error::CaptureError::SourceFailed(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::CaptureError::Internal(format!($($arg)*))
    };
}
