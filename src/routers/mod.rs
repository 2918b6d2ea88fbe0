//! Внешние роутеры вебхуков.
//!
//! Роутер переводит API стороннего источника в публикации брокера. От ядра
//! он получает только [`Publisher`]: публикацию и HMAC-примитив.

use std::{collections::BTreeMap, fmt, sync::Arc};

use async_trait::async_trait;
use axum::Router;
use bytes::Bytes;
use hookbot_error::{ConfigError, HookbotResult};

use crate::{auth, pubsub::Broker};

/// Возможности ядра, доступные роутеру.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Публикует тело так, как будто оно пришло на `/pub/<topic>`.
    async fn publish(
        &self,
        topic: &str,
        body: Bytes,
    ) -> HookbotResult<()>;

    /// `hex(HMAC-SHA1(secret, message))`.
    fn hmac_hex(
        &self,
        secret: &[u8],
        message: &[u8],
    ) -> String {
        auth::hmac_hex(secret, message)
    }
}

/// Роутер стороннего источника вебхуков.
///
/// Маршруты монтируются под `/<name>`.
pub trait WebhookRouter: Send + Sync {
    fn name(&self) -> &'static str;

    fn routes(
        &self,
        publisher: Arc<dyn Publisher>,
    ) -> Router;
}

/// Известные роутеры, из которых при старте включаются выбранные.
#[derive(Default)]
pub struct RouterRegistry {
    known: BTreeMap<&'static str, Arc<dyn WebhookRouter>>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl RouterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        router: Arc<dyn WebhookRouter>,
    ) {
        self.known.insert(router.name(), router);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.known.keys().copied().collect()
    }

    /// Выбирает роутеры по именам. Неизвестное имя даёт
    /// [`ConfigError::UnknownRouter`].
    pub fn enable(
        &self,
        names: &[String],
    ) -> HookbotResult<Vec<Arc<dyn WebhookRouter>>> {
        names
            .iter()
            .map(|name| {
                self.known.get(name.as_str()).cloned().ok_or_else(|| {
                    ConfigError::UnknownRouter {
                        name: name.clone(),
                    }
                    .into()
                })
            })
            .collect()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

#[async_trait]
impl Publisher for Broker {
    async fn publish(
        &self,
        topic: &str,
        body: Bytes,
    ) -> HookbotResult<()> {
        Broker::publish(self, topic, body).await.map(|_| ())
    }
}

impl fmt::Debug for RouterRegistry {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("RouterRegistry")
            .field("known", &self.names())
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
