use std::{fmt, sync::Arc, time::Duration};

use crate::{
    auth::AuthGate,
    config::{BrokerSettings, Secrets},
    pubsub::Broker,
    routers::WebhookRouter,
};

/// Общее состояние HTTP-обработчиков.
#[derive(Clone)]
pub struct AppState {
    pub broker: Broker,
    pub gate: AuthGate,
    /// Дедлайн одной записи в поток подписчика
    pub write_timeout: Duration,
    /// Ждать ли рассылки перед ответом на publish
    pub sync_publish: bool,
    pub routers: Arc<[Arc<dyn WebhookRouter>]>,
}

impl AppState {
    pub fn new(
        broker: Broker,
        secrets: Arc<Secrets>,
        settings: &BrokerSettings,
    ) -> Self {
        Self {
            broker,
            gate: AuthGate::new(secrets),
            write_timeout: settings.write_timeout(),
            sync_publish: settings.sync_publish,
            routers: Arc::from(Vec::new()),
        }
    }

    pub fn with_routers(
        mut self,
        routers: Vec<Arc<dyn WebhookRouter>>,
    ) -> Self {
        self.routers = Arc::from(routers);
        self
    }
}

impl fmt::Debug for AppState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let routers: Vec<_> = self.routers.iter().map(|r| r.name()).collect();
        f.debug_struct("AppState")
            .field("broker", &self.broker)
            .field("write_timeout", &self.write_timeout)
            .field("sync_publish", &self.sync_publish)
            .field("routers", &routers)
            .finish()
    }
}
