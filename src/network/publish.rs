use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use hookbot_error::{LogLevel, PublishError, StackError};
use tracing::{debug, error, warn};

use super::{decode_path, topic_from_path, AppState};
use crate::auth::body_read_failed;

/// `POST /pub/<topic>`: передаёт тело координатору и отвечает `OK`.
///
/// Ответ не зависит от числа подписчиков. С `sync_publish` ответ
/// отправляется после завершения рассылки.
pub async fn publish_handler(
    State(state): State<AppState>,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            let err = PublishError::BodyRead {
                reason: e.body_text(),
            };
            warn!(uri = %uri, "Error serving publish: {err}");
            return body_read_failed(&err);
        }
    };

    let path = match decode_path(uri.path()) {
        Ok(path) => path,
        Err(e) => return error_response(&e),
    };
    let topic = topic_from_path(&path);
    let len = body.len();
    match state.broker.publish(topic, body).await {
        Ok(receipt) => {
            if state.sync_publish && !receipt.dispatched().await {
                warn!(topic, "Broker stopped before dispatching message");
            }
            debug!(topic, bytes = len, "Message published");
            (StatusCode::OK, "OK\n").into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Ответ на ошибку брокера; уровень лога берётся из кода ошибки.
pub(crate) fn error_response(err: &StackError) -> Response {
    let code = err.status_code().code();
    match err.log_level() {
        LogLevel::Error => error!(code, "{err}"),
        LogLevel::Warn => warn!(code, "{err}"),
        _ => debug!(code, "{err}"),
    }
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, format!("{}\n", err.client_message())).into_response()
}
