use std::fmt;

use crate::{ErrorExt, StatusCode};

/// Отказ в доступе к `/pub/...` или `/sub/...`.
///
/// Причина видна только в логах: клиент всегда получает одинаковый ответ
/// "не найдено".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Нет заголовка `Authorization`
    MissingAuthorization,
    /// Заголовок `Authorization` не из двух полей
    MalformedAuthorization { fields: usize },
    /// Схема, отличная от `basic` / `bearer`
    UnsupportedScheme { scheme: String },
    /// Значение `Basic` не декодируется из base64
    InvalidBase64,
    /// Токен не совпал с HMAC пути
    TokenMismatch,
    /// Подпись `X-Hub-Signature` не совпала с HMAC тела
    SignatureMismatch,
}

impl fmt::Display for AuthError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::MissingAuthorization => write!(f, "Authorization header is missing"),
            Self::MalformedAuthorization { fields } => {
                write!(f, "Authorization header has {fields} fields, expected 2")
            }
            Self::UnsupportedScheme { scheme } => {
                write!(f, "Unsupported authorization scheme: {scheme}")
            }
            Self::InvalidBase64 => write!(f, "Basic credentials are not valid base64"),
            Self::TokenMismatch => write!(f, "Access token does not match request path"),
            Self::SignatureMismatch => write!(f, "Webhook signature does not match body"),
        }
    }
}

impl std::error::Error for AuthError {}

impl ErrorExt for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAuthorization => StatusCode::MissingCredentials,
            Self::MalformedAuthorization { .. } | Self::InvalidBase64 => {
                StatusCode::MalformedCredentials
            }
            Self::UnsupportedScheme { .. } => StatusCode::UnsupportedScheme,
            Self::TokenMismatch => StatusCode::TokenMismatch,
            Self::SignatureMismatch => StatusCode::SignatureMismatch,
        }
    }
}
