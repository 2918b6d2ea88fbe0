use crate::{ErrorExt, StatusCode};

/// Ошибка записи в поток подписчика.
///
/// Завершает только эту подписку, повторов нет.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Поток закрыт (конец потока)
    Closed,
    /// Запись не уложилась в дедлайн
    WriteTimeout { after_secs: u64 },
    /// Прочая ошибка транспорта
    Transport { reason: String },
}

/// Ошибки HTTP-сервера.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerError {
    /// Не удалось занять адрес (фатально для процесса)
    Bind { addr: String, reason: String },
    /// Сервер завершился с ошибкой
    Serve { reason: String },
}

impl std::fmt::Display for StreamError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "Stream closed"),
            Self::WriteTimeout { after_secs } => {
                write!(f, "Write did not complete within {after_secs}s")
            }
            Self::Transport { reason } => write!(f, "Stream write failed: {reason}"),
        }
    }
}

impl std::fmt::Display for ServerError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::Bind { addr, reason } => write!(f, "Failed to bind {addr}: {reason}"),
            Self::Serve { reason } => write!(f, "HTTP server failed: {reason}"),
        }
    }
}

impl std::error::Error for StreamError {}

impl std::error::Error for ServerError {}

impl ErrorExt for StreamError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Closed => StatusCode::ConnectionClosed,
            Self::WriteTimeout { .. } => StatusCode::WriteTimeout,
            Self::Transport { .. } => StatusCode::Io,
        }
    }
}

impl ErrorExt for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Bind { .. } => StatusCode::BindFailed,
            Self::Serve { .. } => StatusCode::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogLevel;

    #[test]
    fn test_write_timeout_display() {
        let err = StreamError::WriteTimeout { after_secs: 90 };
        assert_eq!(err.to_string(), "Write did not complete within 90s");
        assert_eq!(err.status_code(), StatusCode::WriteTimeout);
        assert_eq!(err.status_code().log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_closed_stream_is_quiet() {
        assert_eq!(StreamError::Closed.status_code().log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_bind_failure_is_error() {
        let err = ServerError::Bind {
            addr: "0.0.0.0:80".to_string(),
            reason: "permission denied".to_string(),
        };
        assert_eq!(err.status_code().log_level(), LogLevel::Error);
        assert!(err.to_string().contains("0.0.0.0:80"));
    }
}
