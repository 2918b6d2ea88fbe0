use std::{path::Path, time::Duration};

use config::{Config, Environment, File};
use hookbot_error::{ConfigError, HookbotResult, ResultExt, StackError};
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;

/// Адрес по умолчанию, он же `:8080`.
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Параметры координатора и доставки.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerSettings {
    /// Глубина входящей очереди событий координатора
    pub event_queue_capacity: usize,
    /// Сколько DeliveryWorker ждёт свободного слота подписчика
    pub delivery_timeout_ms: u64,
    /// Дедлайн одной записи в поток подписчика
    pub write_timeout_secs: u64,
    /// Отвечать на publish только после завершения рассылки
    pub sync_publish: bool,
}

/// Настройки сервера.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub bind: String,
    #[serde(default)]
    pub broker: BrokerSettings,
    #[serde(default)]
    pub routers: Vec<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BrokerSettings {
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

impl Settings {
    /// Загружает настройки: значения по умолчанию, затем необязательный
    /// файл, затем переменные окружения `HOOKBOT_*` (вложенность через `__`,
    /// например `HOOKBOT_BROKER__SYNC_PUBLISH=true`).
    pub fn load(path: Option<&Path>) -> HookbotResult<Self> {
        let cfg = build_config(path)
            .map_err(load_error)
            .with_context(|| match path {
                Some(path) => format!("reading {}", path.display()),
                None => "reading environment".to_string(),
            })?;
        let settings: Settings = cfg
            .try_deserialize()
            .map_err(load_error)
            .context("decoding settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Проверяет значения, которые нельзя выразить типами.
    pub fn validate(&self) -> HookbotResult<()> {
        if self.bind.trim().is_empty() {
            return Err(invalid("bind", "must not be empty"));
        }
        if self.broker.event_queue_capacity == 0 {
            return Err(invalid("broker.event_queue_capacity", "must be at least 1"));
        }
        if self.broker.delivery_timeout_ms == 0 {
            return Err(invalid("broker.delivery_timeout_ms", "must be positive"));
        }
        if self.broker.write_timeout_secs == 0 {
            return Err(invalid("broker.write_timeout_secs", "must be positive"));
        }
        Ok(())
    }

    /// Адрес для `bind`. Форма `:8080` дополняется до `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> String {
        normalize_bind(&self.bind)
    }
}

pub fn normalize_bind(bind: &str) -> String {
    let bind = bind.trim();
    if bind.starts_with(':') {
        format!("0.0.0.0{bind}")
    } else {
        bind.to_string()
    }
}

fn build_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = Config::builder()
        // Добавляем значения по умолчанию
        .set_default("bind", DEFAULT_BIND)?
        .set_default("broker.event_queue_capacity", 16)?
        .set_default("broker.delivery_timeout_ms", 1000)?
        .set_default("broker.write_timeout_secs", 90)?
        .set_default("broker.sync_publish", false)?;

    if let Some(path) = path {
        builder = builder.add_source(File::from(path));
    }

    // Переменные окружения с префиксом HOOKBOT_
    builder
        .add_source(
            Environment::with_prefix("HOOKBOT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("routers"),
        )
        .build()
}

fn load_error(err: config::ConfigError) -> StackError {
    ConfigError::Load {
        reason: err.to_string(),
    }
    .into()
}

fn invalid(
    field: &str,
    reason: &str,
) -> StackError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для BrokerSettings
////////////////////////////////////////////////////////////////////////////////

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            event_queue_capacity: 16,
            delivery_timeout_ms: 1000,
            write_timeout_secs: 90,
            sync_publish: false,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            broker: BrokerSettings::default(),
            routers: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
