pub mod auth;
pub mod config;
pub mod network;
pub mod pubsub;

pub use auth::*;
pub use config::*;
pub use network::*;
pub use pubsub::*;

use crate::{ErrorExt, StatusCode};

/// Ошибка без отдельного типа: код и текст.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericError {
    code: StatusCode,
    message: String,
}

impl GenericError {
    pub fn new(
        code: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for GenericError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for GenericError {}

impl ErrorExt for GenericError {
    fn status_code(&self) -> StatusCode {
        self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_error_keeps_code_and_text() {
        let err = GenericError::new(StatusCode::InvalidArgs, "bad --url-base");
        assert_eq!(err.status_code(), StatusCode::InvalidArgs);
        assert_eq!(err.to_string(), "bad --url-base");
        assert_eq!(err.client_message(), "bad --url-base");
    }

    #[test]
    fn test_generic_internal_is_hidden_from_client() {
        let err = GenericError::new(StatusCode::Internal, "coordinator panicked");
        assert_eq!(err.client_message(), "Internal server error");
    }
}
