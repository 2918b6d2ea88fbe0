use crate::{ErrorExt, StatusCode};

/// Ошибки загрузки и проверки конфигурации.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Секрет не задан или пуст
    MissingSecret { name: String },
    /// Недопустимое значение поля
    Invalid { field: String, reason: String },
    /// Источник конфигурации не прочитан
    Load { reason: String },
    /// Запрошен неизвестный роутер
    UnknownRouter { name: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::MissingSecret { name } => write!(f, "Secret {name} is not set"),
            Self::Invalid { field, reason } => write!(f, "Invalid value for {field}: {reason}"),
            Self::Load { reason } => write!(f, "Failed to load configuration: {reason}"),
            Self::UnknownRouter { name } => write!(f, "Unknown router: {name}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ErrorExt for ConfigError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingSecret { .. } => StatusCode::MissingSecret,
            Self::Invalid { .. } | Self::Load { .. } => StatusCode::ConfigInvalid,
            Self::UnknownRouter { .. } => StatusCode::UnknownRouter,
        }
    }
}
