use crate::{ErrorExt, StatusCode};

/// Ошибки публикации и подписки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Координатор остановлен, события больше не принимаются
    BrokerStopped,
    /// Не удалось дочитать тело запроса
    BodyRead { reason: String },
}

impl std::fmt::Display for PublishError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::BrokerStopped => write!(f, "Broker is stopped"),
            Self::BodyRead { reason } => write!(f, "Failed to read request body: {reason}"),
        }
    }
}

impl std::error::Error for PublishError {}

impl ErrorExt for PublishError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BrokerStopped => StatusCode::BrokerStopped,
            Self::BodyRead { .. } => StatusCode::BodyReadFailed,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::BrokerStopped => "Service unavailable".to_string(),
            Self::BodyRead { .. } => "Not Authorized".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_read_maps_to_unauthorized() {
        let err = PublishError::BodyRead {
            reason: "connection reset".to_string(),
        };
        assert_eq!(err.status_code().http_status(), 401);
        assert_eq!(err.client_message(), "Not Authorized");
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_broker_stopped() {
        let err = PublishError::BrokerStopped;
        assert_eq!(err.status_code(), StatusCode::BrokerStopped);
        assert_eq!(err.status_code().http_status(), 503);
    }
}
