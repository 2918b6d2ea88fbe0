use std::fmt;

#[cfg(feature = "strum")]
use strum_macros::{AsRefStr, EnumIter};

/// Коды статуса для категоризации ошибок.
///
/// # Диапазоны:
/// - 1xxx: Общие ошибки
/// - 3xxx: Аутентификация
/// - 4xxx: Pub/Sub
/// - 6xxx: Сеть / IO
/// - 9xxx: Конфигурация
#[cfg_attr(feature = "strum", derive(AsRefStr, EnumIter))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 1xxx: Общие ошибки ===
    Internal = 1000,
    InvalidArgs = 1001,

    // === 3xxx: Аутентификация ===
    MissingCredentials = 3000,
    MalformedCredentials = 3001,
    UnsupportedScheme = 3002,
    TokenMismatch = 3003,
    SignatureMismatch = 3004,

    // === 4xxx: Pub/Sub ===
    BrokerStopped = 4000,
    BodyReadFailed = 4001,

    // === 6xxx: Сеть/IO ===
    Io = 6000,
    ConnectionClosed = 6001,
    WriteTimeout = 6002,
    BindFailed = 6003,

    // === 9xxx: Конфигурация ===
    ConfigInvalid = 9000,
    MissingSecret = 9001,
    UnknownRouter = 9002,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StatusCode {
    /// Числовое представление кода статуса.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Ошибка аутентификации (диапазон 3xxx).
    pub fn is_auth_error(&self) -> bool {
        (3000..=3999).contains(&self.code())
    }

    /// Рекомендуемый уровень логирования для данного кода.
    pub fn log_level(&self) -> LogLevel {
        match self {
            c if c.is_auth_error() => LogLevel::Debug,
            Self::ConnectionClosed => LogLevel::Debug,
            Self::BodyReadFailed
            | Self::WriteTimeout
            | Self::BrokerStopped => LogLevel::Warn,
            Self::Internal
            | Self::BindFailed
            | Self::ConfigInvalid
            | Self::MissingSecret
            | Self::UnknownRouter => LogLevel::Error,
            _ => LogLevel::Warn,
        }
    }

    /// HTTP-статус, соответствующий коду статуса.
    ///
    /// Любой отказ аутентификации отображается в `404`, чтобы ответ нельзя
    /// было отличить от несуществующего маршрута.
    pub fn http_status(&self) -> u16 {
        match self {
            c if c.is_auth_error() => 404,
            Self::BodyReadFailed => 401,
            Self::InvalidArgs => 400,
            Self::WriteTimeout => 408,
            Self::BrokerStopped => 503,
            _ => 500,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StatusCode
////////////////////////////////////////////////////////////////////////////////

impl From<StatusCode> for u32 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        #[cfg(feature = "strum")]
        {
            write!(f, "{} ({})", self.as_ref(), self.code())
        }
        #[cfg(not(feature = "strum"))]
        {
            write!(f, "{:?} ({})", self, self.code())
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет, что все ошибки аутентификации маскируются под 404.
    #[test]
    fn test_auth_errors_map_to_not_found() {
        for code in [
            StatusCode::MissingCredentials,
            StatusCode::MalformedCredentials,
            StatusCode::UnsupportedScheme,
            StatusCode::TokenMismatch,
            StatusCode::SignatureMismatch,
        ] {
            assert!(code.is_auth_error());
            assert_eq!(code.http_status(), 404, "code={code}");
        }
    }

    /// Тест проверяет соответствие прочих кодов HTTP-статусам.
    #[test]
    fn test_http_mapping() {
        assert_eq!(StatusCode::InvalidArgs.http_status(), 400);
        assert_eq!(StatusCode::BodyReadFailed.http_status(), 401);
        assert_eq!(StatusCode::BrokerStopped.http_status(), 503);
        assert_eq!(StatusCode::Internal.http_status(), 500);
    }

    /// Тест проверяет числовые значения кодов.
    #[test]
    fn test_numeric_codes() {
        let raw: u32 = StatusCode::MissingSecret.into();
        assert_eq!(raw, 9001);
        assert_eq!(StatusCode::BindFailed.code(), 6003);
    }

    /// Тест проверяет уровни логирования.
    #[test]
    fn test_log_levels() {
        assert_eq!(StatusCode::ConnectionClosed.log_level(), LogLevel::Debug);
        assert_eq!(StatusCode::TokenMismatch.log_level(), LogLevel::Debug);
        assert_eq!(StatusCode::WriteTimeout.log_level(), LogLevel::Warn);
        assert_eq!(StatusCode::BindFailed.log_level(), LogLevel::Error);
    }

    /// Тест проверяет формат `Display`.
    #[test]
    fn test_display_contains_name_and_code() {
        let s = StatusCode::BindFailed.to_string();
        assert!(s.contains("6003"), "got: {s}");
        assert!(s.contains("BindFailed"), "got: {s}");
    }
}
