use std::{fmt, panic::Location, sync::Arc};

use crate::{ErrorExt, LogLevel, StatusCode};

/// Ошибка hookbot: типизированная причина и цепочка шагов, через которые
/// она прошла.
///
/// Каждый шаг помнит место вызова (`#[track_caller]`), поэтому в логах
/// видно, где ошибка была обёрнута. Клиенту уходит только
/// [`StackError::client_message`].
#[derive(Clone)]
pub struct StackError {
    cause: Arc<dyn ErrorExt>,
    trail: Vec<ErrorContext>,
}

/// Один шаг цепочки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    pub message: String,
    pub file: &'static str,
    pub line: u32,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StackError {
    #[track_caller]
    pub fn new<E: ErrorExt>(err: E) -> Self {
        Self {
            cause: Arc::new(err),
            trail: Vec::new(),
        }
    }

    /// Добавляет шаг в цепочку.
    #[track_caller]
    pub fn context(
        mut self,
        msg: impl Into<String>,
    ) -> Self {
        let caller = Location::caller();
        self.trail.push(ErrorContext {
            message: msg.into(),
            file: caller.file(),
            line: caller.line(),
        });
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.cause.status_code()
    }

    /// HTTP-статус ответа для этой ошибки.
    pub fn http_status(&self) -> u16 {
        self.status_code().http_status()
    }

    pub fn client_message(&self) -> String {
        self.cause.client_message()
    }

    /// Шаги в порядке добавления (от внутреннего к внешнему).
    pub fn contexts(&self) -> &[ErrorContext] {
        &self.trail
    }

    pub fn log_level(&self) -> LogLevel {
        self.status_code().log_level()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StackError
////////////////////////////////////////////////////////////////////////////////

impl fmt::Debug for StackError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let trail: Vec<String> = self
            .trail
            .iter()
            .map(|c| format!("{} at {}:{}", c.message, c.file, c.line))
            .collect();

        f.debug_struct("StackError")
            .field("code", &self.status_code())
            .field("cause", &self.cause.log_message())
            .field("trail", &trail)
            .finish()
    }
}

/// Внешний шаг первым: `serve: bind: Failed to bind ...`.
impl fmt::Display for StackError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for step in self.trail.iter().rev() {
            write!(f, "{}: ", step.message)?;
        }
        write!(f, "{}", self.cause)
    }
}

impl std::error::Error for StackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause.as_ref())
    }
}

impl<E: ErrorExt> From<E> for StackError {
    #[track_caller]
    fn from(e: E) -> Self {
        StackError::new(e)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuthError, PublishError};

    #[test]
    fn test_trail_records_caller() {
        let err = StackError::new(PublishError::BrokerStopped)
            .context("publish handler")
            .context("POST /pub/builds");

        assert_eq!(err.contexts().len(), 2);
        assert_eq!(err.contexts()[0].message, "publish handler");
        assert!(err.contexts()[0].file.ends_with("stack.rs"));
        assert!(err.contexts()[0].line > 0);
    }

    /// Тест проверяет, что клиент не видит причину отказа доступа.
    #[test]
    fn test_auth_client_message_is_masked() {
        let err = StackError::new(AuthError::TokenMismatch).context("gate");

        assert_eq!(err.client_message(), "Not found");
        assert_eq!(err.http_status(), 404);
    }

    /// Тест проверяет порядок шагов в `Display`: внешний первым.
    #[test]
    fn test_display_outer_first() {
        let err = StackError::new(PublishError::BrokerStopped)
            .context("fan-out")
            .context("router relay");

        assert_eq!(err.to_string(), "router relay: fan-out: Broker is stopped");
        assert_eq!(err.http_status(), 503);
    }
}
