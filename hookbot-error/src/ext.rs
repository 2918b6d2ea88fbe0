use std::error::Error;

use crate::StatusCode;

/// Расширение для ошибок hookbot (object-safe).
///
/// Даёт единый способ получить статус-код, безопасное сообщение для клиента и
/// детальное сообщение для логов.
pub trait ErrorExt: Error + Send + Sync + 'static {
    /// Статус ошибки. По умолчанию [`StatusCode::Internal`].
    fn status_code(&self) -> StatusCode {
        StatusCode::Internal
    }

    /// Безопасное сообщение для клиента.
    ///
    /// Для внутренних ошибок возвращает `"Internal server error"`, для
    /// ошибок аутентификации не раскрывает причину отказа.
    fn client_message(&self) -> String {
        match self.status_code() {
            StatusCode::Internal => "Internal server error".to_string(),
            code if code.is_auth_error() => "Not found".to_string(),
            _ => self.to_string(),
        }
    }

    /// Детализированное сообщение для логов.
    fn log_message(&self) -> String {
        format!("{self:?}")
    }

    /// Имя типа ошибки (для логирования).
    fn type_name(&self) -> String {
        std::any::type_name::<Self>()
            .split("::")
            .last()
            .unwrap_or("Unknown")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;

    #[derive(Debug)]
    struct Sample(StatusCode);

    impl fmt::Display for Sample {
        fn fmt(
            &self,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            write!(f, "sample failed with {}", self.0)
        }
    }

    impl Error for Sample {}

    impl ErrorExt for Sample {
        fn status_code(&self) -> StatusCode {
            self.0
        }
    }

    /// Тест проверяет, что внутренние ошибки скрываются от клиента.
    #[test]
    fn test_client_message_hides_internal() {
        let err = Sample(StatusCode::Internal);
        assert_eq!(err.client_message(), "Internal server error");
    }

    /// Тест проверяет, что причина отказа аутентификации не раскрывается.
    #[test]
    fn test_client_message_hides_auth_reason() {
        let err = Sample(StatusCode::TokenMismatch);
        assert_eq!(err.client_message(), "Not found");
    }

    /// Тест проверяет, что прочие ошибки показываются как есть.
    #[test]
    fn test_client_message_passthrough() {
        let err = Sample(StatusCode::InvalidArgs);
        assert!(err.client_message().contains("sample failed"));
        assert_eq!(err.type_name(), "Sample");
    }
}
