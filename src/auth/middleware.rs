use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use hookbot_error::{ErrorExt, PublishError};
use tracing::{debug, warn};

use super::{AuthGate, HUB_SIGNATURE};
use crate::network::{decode_path, publish::error_response};

/// Тело ответа для несуществующего маршрута и для отказа в доступе.
pub const NOT_FOUND_BODY: &str = "404 page not found\n";

/// Ответ 404, неотличимый от отсутствующего маршрута.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
}

/// Middleware проверки доступа.
///
/// Токен сверяется с декодированным путём. Тело буферизуется только при
/// наличии `X-Hub-Signature` и затем возвращается в запрос для следующего
/// обработчика. Ошибка чтения тела даёт 401, любой отказ проверки даёт 404.
pub async fn require_auth(
    State(gate): State<AuthGate>,
    request: Request,
    next: Next,
) -> Response {
    let path = match decode_path(request.uri().path()) {
        Ok(path) => path.into_owned(),
        Err(e) => return error_response(&e),
    };

    if !request.headers().contains_key(HUB_SIGNATURE) {
        return match gate.verify(request.headers(), &path, None) {
            Ok(()) => next.run(request).await,
            Err(e) => {
                debug!(path = %path, code = e.status_code().code(), "Access denied: {e}");
                not_found()
            }
        };
    }

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let err = PublishError::BodyRead {
                reason: e.to_string(),
            };
            warn!(path = %path, "{err}");
            return body_read_failed(&err);
        }
    };

    if let Err(e) = gate.verify(&parts.headers, &path, Some(&bytes)) {
        debug!(path = %path, code = e.status_code().code(), "Access denied: {e}");
        return not_found();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// Ответ на ошибку чтения тела: 401 с текстом клиентского сообщения.
pub fn body_read_failed(err: &PublishError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code().http_status()).unwrap_or(StatusCode::UNAUTHORIZED);
    (status, format!("{}\n", err.client_message())).into_response()
}
