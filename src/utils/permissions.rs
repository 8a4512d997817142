use crate::capture_error;
use crate::error::Result;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

const INPUT_DIR: &str = "/dev/input";

/// Проверить доступ к `/dev/input`, без которого evdev не может читать клавиатуры
pub fn check_input_devices_access() -> Result<()> {
    check_input_dir_access(Path::new(INPUT_DIR))
}

fn check_input_dir_access(input_dir: &Path) -> Result<()> {
    if !input_dir.exists() {
        return Err(capture_error!(
            unsupported,
            "директория {} не существует",
            input_dir.display()
        ));
    }

    // Проверяем возможность чтения директории
    match fs::read_dir(input_dir) {
        Ok(_) => {
            info!("Доступ к {} подтвержден", input_dir.display());
            Ok(())
        }
        Err(e) => Err(capture_error!(
            permission,
            "нет доступа к {}: {}. Добавьте пользователя в группу 'input'",
            input_dir.display(),
            e
        )),
    }
}

/// Предупредить о запуске от root: захват клавиатуры работает и от группы input
pub fn check_not_root() {
    match std::env::var("USER") {
        Ok(user) if user == "root" => {
            warn!("⚠️  Приложение запущено от имени root!");
            warn!("   Для чтения клавиатуры достаточно группы 'input':");
            for command in get_setup_commands().iter().filter(|c| !c.starts_with('#') && !c.is_empty()) {
                warn!("   {}", command);
            }
        }
        Ok(user) => {
            info!("Приложение запущено от имени пользователя: {}", user);
        }
        Err(_) => {
            warn!("Не удалось определить пользователя");
        }
    }
}

/// Получить рекомендуемые команды для настройки прав доступа
pub fn get_setup_commands() -> Vec<String> {
    vec![
        "# Добавить пользователя в группу input:".to_string(),
        "sudo usermod -a -G input $USER".to_string(),
        "".to_string(),
        "# После выполнения команды перезайдите в систему".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptureError;

    #[test]
    fn test_setup_commands() {
        let commands = get_setup_commands();
        assert!(!commands.is_empty());
        assert!(commands.iter().any(|cmd| cmd.contains("usermod")));
    }

    #[test]
    fn test_missing_input_dir_is_unsupported() {
        let result = check_input_dir_access(Path::new("/non/existent/input"));
        assert!(matches!(result, Err(CaptureError::PlatformUnsupported(_))));
    }

    #[test]
    fn test_readable_dir_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_input_dir_access(dir.path()).is_ok());
    }
}
