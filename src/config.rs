use crate::chord::Chord;
use crate::events::KeybindId;
use crate::services::RepeatPolicy;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub capture: CaptureConfig,
    pub keybinds: Vec<KeybindConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `compact` или `full`
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// `auto` - все доступные клавиатуры, иначе путь к `/dev/input/event*`
    pub device_path: String,
    pub repeat_policy: RepeatPolicy,
    pub report_releases: bool,
    pub window_id: Option<u64>,
    pub display_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeybindConfig {
    pub id: KeybindId,
    pub chord: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_path: "auto".to_string(),
            repeat_policy: RepeatPolicy::default(),
            report_releases: false,
            window_id: None,
            display_id: None,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("KEYBIND_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        if self.capture.device_path.trim().is_empty() {
            anyhow::bail!("device_path не может быть пустым (используйте \"auto\")");
        }

        // Валидация keybind'ов
        let mut seen = HashSet::new();
        for (i, keybind) in self.keybinds.iter().enumerate() {
            Chord::parse(&keybind.chord)
                .with_context(|| format!("Неверное сочетание в keybind #{}", i + 1))?;

            if !seen.insert(keybind.id) {
                warn!(
                    "Повторный id {} в keybind #{}: используется последнее сочетание",
                    keybind.id,
                    i + 1
                );
            }
        }

        Ok(())
    }

    /// Разобранные сочетания в порядке объявления
    pub fn chords(&self) -> Result<Vec<(KeybindId, Chord)>> {
        self.keybinds
            .iter()
            .map(|keybind| Ok((keybind.id, Chord::parse(&keybind.chord)?)))
            .collect()
    }
}
