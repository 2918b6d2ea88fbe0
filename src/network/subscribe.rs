use std::{error::Error as _, io, time::Duration};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::Uri,
    response::Response,
};
use bytes::Bytes;
use futures_util::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use hookbot_error::{ErrorExt, LogLevel, StreamError};
use tracing::{debug, info, warn};

use super::{decode_path, publish::error_response, topic_from_path, AppState};
use crate::pubsub::Subscription;

/// `GET /sub/<topic>`: регистрирует слушателя и переводит соединение
/// в WebSocket.
///
/// Если upgrade не состоялся, подписка удаляется вместе с замыканием.
pub async fn subscribe_handler(
    State(state): State<AppState>,
    uri: Uri,
    ws: WebSocketUpgrade,
) -> Response {
    let path = match decode_path(uri.path()) {
        Ok(path) => path,
        Err(e) => return error_response(&e),
    };
    let subscription = match state.broker.subscribe(topic_from_path(&path)).await {
        Ok(subscription) => subscription,
        Err(e) => return error_response(&e),
    };

    let write_timeout = state.write_timeout;
    ws.on_upgrade(move |socket| run_subscription(socket, subscription, write_timeout))
}

/// Обслуживает одно подключение подписчика до разрыва или ошибки записи.
///
/// Читатель только отбрасывает входящие кадры и сигнализирует о закрытии.
/// Писатель ждёт либо тело из слота, либо закрытия; ожидание без таймаута,
/// дедлайн есть только у самой записи.
pub async fn run_subscription(
    socket: WebSocket,
    mut subscription: Subscription,
    write_timeout: Duration,
) {
    let (mut sink, mut stream) = socket.split();
    let mut reader = tokio::spawn(async move {
        while let Some(Ok(_)) = stream.next().await {}
    });

    let listener = subscription.id();
    debug!(%listener, topic = subscription.topic(), "Subscriber connected");

    loop {
        let body = tokio::select! {
            _ = &mut reader => {
                info!(%listener, "Client disconnected");
                break;
            }
            body = subscription.recv() => match body {
                Some(body) => body,
                None => {
                    debug!(%listener, "Broker stopped, closing subscriber");
                    break;
                }
            },
        };

        if let Err(e) = write_body(&mut sink, body, write_timeout).await {
            match e.status_code().log_level() {
                LogLevel::Debug | LogLevel::Trace => debug!(%listener, "{e}"),
                _ => warn!(%listener, "Error writing to subscriber: {e}"),
            }
            break;
        }
    }

    reader.abort();
    subscription.unsubscribe().await;
}

/// Одна запись тела с дедлайном. Валидный UTF-8 уходит Text-кадром,
/// остальное Binary-кадром.
async fn write_body(
    sink: &mut SplitSink<WebSocket, Message>,
    body: Bytes,
    deadline: Duration,
) -> Result<(), StreamError> {
    let frame = match String::from_utf8(body.to_vec()) {
        Ok(text) => Message::Text(text),
        Err(e) => Message::Binary(e.into_bytes()),
    };

    match tokio::time::timeout(deadline, sink.send(frame)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(classify_write_error(&e)),
        Err(_) => Err(StreamError::WriteTimeout {
            after_secs: deadline.as_secs(),
        }),
    }
}

/// Разрыв соединения отличается от прочих ошибок транспорта.
fn classify_write_error(err: &axum::Error) -> StreamError {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::BrokenPipe
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::UnexpectedEof
            ) {
                return StreamError::Closed;
            }
        }
        source = cause.source();
    }
    StreamError::Transport {
        reason: err.to_string(),
    }
}
