use std::{future::Future, sync::Arc};

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    response::Response,
    routing::{get, post},
    Router,
};
use hookbot_error::{HookbotResult, ServerError};
use tokio::net::TcpListener;
use tracing::{error, info};

use super::{publish_handler, subscribe_handler, AppState};
use crate::{
    auth::{not_found, require_auth},
    routers::Publisher,
};

/// Собирает HTTP-поверхность.
///
/// `/pub/*` и `/sub/*` закрыты проверкой доступа, `/status` открыт,
/// внешние роутеры монтируются под `/<name>`. Всё остальное получает тот
/// же 404, что и отказ в доступе. Ограничения размера тела нет.
pub fn build_router(state: AppState) -> Router {
    // `/pub/` отдельно: wildcard не совпадает с пустым остатком.
    let authed = Router::new()
        .route("/pub/", post(publish_handler))
        .route("/pub/*topic", post(publish_handler))
        .route("/sub/", get(subscribe_handler))
        .route("/sub/*topic", get(subscribe_handler))
        .layer(from_fn_with_state(state.gate.clone(), require_auth))
        .with_state(state.clone());

    let mut app = Router::new().route("/status", get(status)).merge(authed);

    let publisher: Arc<dyn Publisher> = Arc::new(state.broker.clone());
    for router in state.routers.iter() {
        info!(router = router.name(), "Enabling webhook router");
        app = app.nest(&format!("/{}", router.name()), router.routes(publisher.clone()));
    }

    app.fallback(fallback).layer(DefaultBodyLimit::disable())
}

/// Привязывает адрес из настроек и обслуживает запросы до сигнала
/// `shutdown`. Ошибка привязки фатальна.
pub async fn serve<F>(
    state: AppState,
    bind: &str,
    shutdown: F,
) -> HookbotResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(bind).await.map_err(|e| {
        error!(addr = bind, "Failed to bind: {e}");
        ServerError::Bind {
            addr: bind.to_string(),
            reason: e.to_string(),
        }
    })?;

    serve_listener(listener, state, shutdown).await
}

/// Обслуживает уже привязанный listener. После сигнала дожидается
/// текущих HTTP-запросов, затем останавливает брокер и ждёт все доставки.
pub async fn serve_listener<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> HookbotResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Listening");
    }

    let broker = state.broker.clone();
    let result = axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await;

    info!("HTTP server stopped, draining broker");
    broker.shutdown().await;

    result.map_err(|e| {
        ServerError::Serve {
            reason: e.to_string(),
        }
        .into()
    })
}

async fn status() -> &'static str {
    "OK\n"
}

async fn fallback() -> Response {
    not_found()
}
