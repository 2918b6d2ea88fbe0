use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use bytes::Bytes;
use hookbot_error::{ensure, HookbotResult, PublishError, StackError};
use tokio::{
    sync::{mpsc, oneshot, Mutex},
    task::JoinHandle,
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{debug, info, trace, warn};

use super::{
    deliver, DeliveryOutcome, DispatchReceipt, Listener, ListenerId, Message, Subscription,
    DEFAULT_DELIVERY_TIMEOUT,
};
use crate::config::BrokerSettings;

/// Событие входящей очереди координатора.
#[derive(Debug)]
pub(crate) enum Event {
    Add(Listener),
    Del(ListenerId),
    Publish {
        message: Message,
        done: oneshot::Sender<()>,
    },
}

/// Параметры брокера.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerConfig {
    /// Глубина входящей очереди (publish ждёт места)
    pub event_queue_capacity: usize,
    /// Сколько ждёт один DeliveryWorker
    pub delivery_timeout: Duration,
}

/// Снимок счётчиков брокера.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BrokerStats {
    /// Обработанные координатором публикации
    pub published: u64,
    /// Запущенные DeliveryWorker
    pub fanned_out: u64,
    /// Тела, принятые слотами
    pub delivered: u64,
    /// Тела, отброшенные по таймауту
    pub dropped: u64,
    /// Доставки в уже закрытых слушателей
    pub closed: u64,
    /// Слушатели в реестре
    pub listeners: usize,
}

#[derive(Debug, Default)]
struct Counters {
    published: AtomicU64,
    fanned_out: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
    closed: AtomicU64,
    listeners: AtomicUsize,
}

struct Inner {
    config: BrokerConfig,
    events: mpsc::Sender<Event>,
    cancel: CancellationToken,
    workers: TaskTracker,
    counters: Arc<Counters>,
    coordinator: Mutex<Option<JoinHandle<()>>>,
    stopped: AtomicBool,
}

/// Брокер тем.
///
/// Единственная задача-координатор владеет реестром слушателей и
/// обрабатывает события строго по одному в порядке поступления. На каждую
/// пару (публикация, слушатель темы) запускается DeliveryWorker с
/// ограниченным временем ожидания слота.
///
/// Клонирование дёшево: все клоны ссылаются на один координатор.
#[derive(Clone)]
pub struct Broker {
    inner: Arc<Inner>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Broker {
    /// Создаёт брокер и запускает координатор.
    ///
    /// Должен вызываться внутри Tokio runtime.
    pub fn new(config: BrokerConfig) -> Self {
        let (events, rx) = mpsc::channel(config.event_queue_capacity.max(1));
        let cancel = CancellationToken::new();
        let workers = TaskTracker::new();
        let counters = Arc::new(Counters::default());

        let coordinator = tokio::spawn(run_coordinator(
            rx,
            cancel.clone(),
            workers.clone(),
            counters.clone(),
            config.delivery_timeout,
        ));

        Self {
            inner: Arc::new(Inner {
                config,
                events,
                cancel,
                workers,
                counters,
                coordinator: Mutex::new(Some(coordinator)),
                stopped: AtomicBool::new(false),
            }),
        }
    }

    pub fn config(&self) -> BrokerConfig {
        self.inner.config
    }

    pub fn is_running(&self) -> bool {
        !self.inner.stopped.load(Ordering::Acquire)
    }

    /// Регистрирует слушателя темы.
    pub async fn subscribe(
        &self,
        topic: &str,
    ) -> HookbotResult<Subscription> {
        self.ensure_running()?;

        let (listener, slot) = Listener::new(Arc::from(topic));
        let id = listener.id;
        let topic = listener.topic.clone();
        self.send_event(Event::Add(listener)).await?;

        debug!(listener = %id, topic = %topic, "Listener registered");
        Ok(Subscription::new(
            id,
            topic,
            slot,
            self.inner.events.clone(),
            self.inner.workers.clone(),
        ))
    }

    /// Передаёт сообщение координатору.
    ///
    /// Ждёт места во входящей очереди, но не ждёт рассылки: для этого
    /// есть [`DispatchReceipt::dispatched`].
    pub async fn publish(
        &self,
        topic: &str,
        body: Bytes,
    ) -> HookbotResult<DispatchReceipt> {
        self.ensure_running()?;

        let (done, rx) = oneshot::channel();
        let message = Message::new(topic, body);
        self.send_event(Event::Publish { message, done }).await?;

        Ok(DispatchReceipt::new(rx))
    }

    /// Публикует и ждёт, пока координатор запустит все доставки.
    pub async fn publish_and_wait(
        &self,
        topic: &str,
        body: Bytes,
    ) -> HookbotResult<bool> {
        let receipt = self.publish(topic, body).await?;
        Ok(receipt.dispatched().await)
    }

    /// Останавливает координатор и ждёт все DeliveryWorker.
    ///
    /// Повторный вызов безопасен. Возвращается только тогда, когда каждая
    /// начатая доставка завершилась или истекла по таймауту.
    pub async fn shutdown(&self) {
        let first = !self.inner.stopped.swap(true, Ordering::AcqRel);
        if first {
            info!("Broker shutdown initiated");
        }
        self.inner.cancel.cancel();

        // Lock держится до конца: параллельный вызов не увидит пустой
        // трекер раньше, чем координатор выйдет.
        let mut coordinator = self.inner.coordinator.lock().await;
        if let Some(handle) = coordinator.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Coordinator task failed");
            }
        }

        self.inner.workers.close();
        self.inner.workers.wait().await;

        if first {
            let stats = self.stats();
            info!(
                published = stats.published,
                delivered = stats.delivered,
                dropped = stats.dropped,
                "Broker stopped"
            );
        }
    }

    pub fn stats(&self) -> BrokerStats {
        let c = &self.inner.counters;
        BrokerStats {
            published: c.published.load(Ordering::Relaxed),
            fanned_out: c.fanned_out.load(Ordering::Relaxed),
            delivered: c.delivered.load(Ordering::Relaxed),
            dropped: c.dropped.load(Ordering::Relaxed),
            closed: c.closed.load(Ordering::Relaxed),
            listeners: c.listeners.load(Ordering::Relaxed),
        }
    }

    fn ensure_running(&self) -> HookbotResult<()> {
        ensure!(self.is_running(), PublishError::BrokerStopped);
        Ok(())
    }

    async fn send_event(
        &self,
        event: Event,
    ) -> HookbotResult<()> {
        self.inner
            .events
            .send(event)
            .await
            .map_err(|_| StackError::from(PublishError::BrokerStopped))
    }
}

/// Цикл координатора: единственное место, где меняется реестр.
async fn run_coordinator(
    mut events: mpsc::Receiver<Event>,
    cancel: CancellationToken,
    workers: TaskTracker,
    counters: Arc<Counters>,
    delivery_timeout: Duration,
) {
    let mut registry: HashMap<ListenerId, Listener> = HashMap::new();

    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        match event {
            Event::Add(listener) => {
                registry.insert(listener.id, listener);
                counters.listeners.store(registry.len(), Ordering::Relaxed);
            }
            Event::Del(id) => {
                if registry.remove(&id).is_some() {
                    debug!(listener = %id, "Listener removed");
                    counters.listeners.store(registry.len(), Ordering::Relaxed);
                }
            }
            Event::Publish { message, done } => {
                counters.published.fetch_add(1, Ordering::Relaxed);

                let mut spawned = 0u64;
                for listener in registry.values() {
                    if *listener.topic != *message.topic {
                        continue;
                    }
                    let slot = listener.slot.clone();
                    let body = message.body.clone();
                    let counters = counters.clone();
                    workers.spawn(async move {
                        let outcome = deliver(&slot, body, delivery_timeout).await;
                        if outcome == DeliveryOutcome::TimedOut {
                            trace!("Slot busy, message dropped");
                        }
                        let counter = match outcome {
                            DeliveryOutcome::Delivered => &counters.delivered,
                            DeliveryOutcome::TimedOut => &counters.dropped,
                            DeliveryOutcome::ListenerGone => &counters.closed,
                        };
                        counter.fetch_add(1, Ordering::Relaxed);
                    });
                    spawned += 1;
                }
                counters.fanned_out.fetch_add(spawned, Ordering::Relaxed);

                debug!(topic = %message.topic, workers = spawned, "Message dispatched");
                let _ = done.send(());
            }
        }
    }

    counters.listeners.store(0, Ordering::Relaxed);
    debug!(listeners = registry.len(), "Coordinator stopped");
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            event_queue_capacity: 16,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }
}

impl From<&BrokerSettings> for BrokerConfig {
    fn from(settings: &BrokerSettings) -> Self {
        Self {
            event_queue_capacity: settings.event_queue_capacity,
            delivery_timeout: settings.delivery_timeout(),
        }
    }
}

impl std::fmt::Debug for Broker {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Broker")
            .field("config", &self.inner.config)
            .field("running", &self.is_running())
            .field("stats", &self.stats())
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
