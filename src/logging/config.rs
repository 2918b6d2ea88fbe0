use std::{env, fs, io, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Допустимые уровни логирования.
const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Формат вывода в консоль.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Многострочный человекочитаемый вывод
    Pretty,
    /// Одна строка на событие
    #[default]
    Compact,
    /// JSON (для сборщиков логов)
    Json,
}

/// Файловый sink: ежедневная ротация в `dir/prefix.YYYY-MM-DD`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileSinkConfig {
    pub dir: PathBuf,
    pub prefix: String,
}

/// Конфигурация логирования.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Уровень по умолчанию (`RUST_LOG` имеет приоритет)
    pub level: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
    /// Файловый sink выключен, если `None`
    pub file: Option<FileSinkConfig>,
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),
    #[error("Log directory error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to install subscriber: {0}")]
    Init(String),
}

impl LoggingConfig {
    /// Применяет `HOOKBOT_LOG_LEVEL` и `HOOKBOT_LOG_FORMAT`, если заданы.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("HOOKBOT_LOG_LEVEL") {
            self.level = level.to_lowercase();
        }
        if let Ok(format) = env::var("HOOKBOT_LOG_FORMAT") {
            match format.to_lowercase().as_str() {
                "pretty" => self.format = LogFormat::Pretty,
                "compact" => self.format = LogFormat::Compact,
                "json" => self.format = LogFormat::Json,
                _ => {}
            }
        }
    }

    pub fn validate(&self) -> Result<(), LoggingError> {
        if !LEVELS.contains(&self.level.as_str()) {
            return Err(LoggingError::InvalidLevel(self.level.clone()));
        }
        Ok(())
    }

    /// Создаёт каталог для файлового sink.
    pub fn ensure_log_dir(&self) -> Result<(), LoggingError> {
        if let Some(file) = &self.file {
            fs::create_dir_all(&file.dir)?;
        }
        Ok(())
    }

    /// Директива для `EnvFilter`: свой уровень для hookbot, шумные
    /// транспортные крейты приглушены.
    pub fn build_filter_directive(&self) -> String {
        format!(
            "{level},hookbot={level},hyper=warn,tungstenite=warn",
            level = self.level
        )
    }
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            prefix: "hookbot.log".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            with_ansi: true,
            with_target: true,
            file: None,
        }
    }
}
