use crate::capture_error;
use crate::error::{CaptureError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const INPUT_DIR: &str = "/dev/input";

pub struct DeviceFinder;

impl DeviceFinder {
    /// Найти клавиатурные устройства: `auto` - все доступные, иначе указанное
    pub fn find_keyboard_devices(device_path: &str) -> Result<Vec<PathBuf>> {
        if device_path != "auto" {
            let path = PathBuf::from(device_path);
            return if path.exists() {
                info!("Используется указанное устройство: {:?}", path);
                Ok(vec![path])
            } else {
                CaptureError::device_not_found(format!(
                    "указанное устройство не найдено: {:?}",
                    path
                ))
            };
        }

        Self::auto_find_keyboards(Path::new(INPUT_DIR))
    }

    fn auto_find_keyboards(input_dir: &Path) -> Result<Vec<PathBuf>> {
        info!("Начинаем автопоиск клавиатурных устройств...");

        let keyboards: Vec<PathBuf> = Self::event_devices(input_dir)?
            .into_iter()
            .filter(|path| Self::is_device_accessible(path) && Self::is_keyboard_device(path))
            .collect();

        if keyboards.is_empty() {
            return CaptureError::device_not_found(
                "не удалось найти доступную клавиатуру. \
                 Убедитесь, что пользователь добавлен в группу 'input'",
            );
        }

        info!("Найдено клавиатур: {}", keyboards.len());
        Ok(keyboards)
    }

    /// Все `event*` в директории, по возрастанию номера
    fn event_devices(input_dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(input_dir).map_err(|e| {
            capture_error!(permission, "нет доступа к {}: {}", input_dir.display(), e)
        })?;

        let mut event_devices = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_event = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.starts_with("event"));
            if is_event {
                event_devices.push(path);
            }
        }

        event_devices.sort_by_key(|path| Self::event_number(path));
        Ok(event_devices)
    }

    fn event_number(path: &Path) -> u32 {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(|name| name.strip_prefix("event"))
            .and_then(|n| n.parse().ok())
            .unwrap_or(u32::MAX)
    }

    fn is_keyboard_device(device_path: &Path) -> bool {
        match evdev::Device::open(device_path) {
            Ok(device) => {
                let device_name = device.name().unwrap_or("Unknown").to_lowercase();

                // Исключаем мыши по имени устройства
                if device_name.contains("mouse")
                    || device_name.contains("touchpad")
                    || device_name.contains("trackpoint")
                {
                    debug!("Исключаем устройство как мышь/тачпад: {:?} ({})", device_path, device_name);
                    return false;
                }

                let has_keys = device.supported_keys().is_some_and(|keys| {
                    let basic_keys = keys.contains(evdev::KeyCode::KEY_A)
                        && keys.contains(evdev::KeyCode::KEY_SPACE)
                        && keys.contains(evdev::KeyCode::KEY_ENTER);

                    // У настоящей клавиатуры много клавиш
                    basic_keys && keys.iter().count() > 20
                });

                if has_keys {
                    info!("Устройство {:?} подходит как клавиатура ({})", device_path, device_name);
                } else {
                    debug!("Устройство {:?} не подходит как клавиатура ({})", device_path, device_name);
                }
                has_keys
            }
            Err(e) => {
                debug!("Не удалось открыть устройство {:?}: {}", device_path, e);
                false
            }
        }
    }

    fn is_device_accessible(device_path: &Path) -> bool {
        match fs::File::open(device_path) {
            Ok(_) => true,
            Err(e) => {
                warn!("Устройство {:?} недоступно: {}", device_path, e);
                false
            }
        }
    }
}
