use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use bytes::Bytes;
use tokio::{
    runtime::Handle,
    sync::mpsc::{self, error::TrySendError},
};
use tokio_util::task::TaskTracker;
use tracing::debug;

use super::broker::Event;

/// Ёмкость слота доставки одного слушателя.
pub const SLOT_CAPACITY: usize = 1;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Идентичность слушателя. Два слушателя одной темы различаются.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Запись реестра: тема и отправляющая сторона слота.
#[derive(Debug)]
pub(crate) struct Listener {
    pub id: ListenerId,
    pub topic: Arc<str>,
    pub slot: mpsc::Sender<Bytes>,
}

/// Активная подписка на тему.
///
/// Читает слот доставки ёмкостью 1. Отписка происходит при
/// [`Subscription::unsubscribe`] или автоматически при `Drop`.
pub struct Subscription {
    id: ListenerId,
    topic: Arc<str>,
    slot: mpsc::Receiver<Bytes>,
    events: mpsc::Sender<Event>,
    /// Задачи брокера: сюда же попадает досылка `Del` из `Drop`
    tasks: TaskTracker,
    released: bool,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl ListenerId {
    pub(crate) fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Listener {
    /// Создаёт слушателя и читающую сторону его слота.
    pub fn new(topic: Arc<str>) -> (Self, mpsc::Receiver<Bytes>) {
        let (slot, rx) = mpsc::channel(SLOT_CAPACITY);
        let listener = Self {
            id: ListenerId::next(),
            topic,
            slot,
        };
        (listener, rx)
    }
}

impl Subscription {
    pub(crate) fn new(
        id: ListenerId,
        topic: Arc<str>,
        slot: mpsc::Receiver<Bytes>,
        events: mpsc::Sender<Event>,
        tasks: TaskTracker,
    ) -> Self {
        Self {
            id,
            topic,
            slot,
            events,
            tasks,
            released: false,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Ожидает следующее тело из слота.
    ///
    /// `None` означает, что все отправители закрыты (брокер остановлен и
    /// доставки завершены).
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.slot.recv().await
    }

    /// Забирает тело из слота без ожидания.
    pub fn try_recv(&mut self) -> Option<Bytes> {
        self.slot.try_recv().ok()
    }

    /// Явная отписка: ждёт места в очереди координатора.
    pub async fn unsubscribe(mut self) {
        self.released = true;
        if self.events.send(Event::Del(self.id)).await.is_err() {
            debug!(listener = self.id.0, "Broker already stopped on unsubscribe");
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для Subscription
////////////////////////////////////////////////////////////////////////////////

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match self.events.try_send(Event::Del(self.id)) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(event)) => {
                // Очередь занята: досылаем в фоне. Вне runtime остаётся
                // только отдельный поток с блокирующей отправкой.
                let events = self.events.clone();
                match Handle::try_current() {
                    Ok(handle) => {
                        self.tasks.spawn_on(
                            async move {
                                let _ = events.send(event).await;
                            },
                            &handle,
                        );
                    }
                    Err(_) => {
                        std::thread::spawn(move || {
                            let _ = events.blocking_send(event);
                        });
                    }
                }
            }
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .finish()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    /// Тест проверяет, что идентификаторы уникальны
    #[test]
    fn test_listener_ids_are_unique() {
        let ids: HashSet<_> = (0..100).map(|_| ListenerId::next()).collect();
        assert_eq!(ids.len(), 100);
    }

    /// Тест проверяет, что слот вмещает ровно одно тело
    #[test]
    fn test_slot_holds_single_value() {
        let (listener, _rx) = Listener::new(Arc::from("t"));

        assert!(listener.slot.try_send(Bytes::from_static(b"1")).is_ok());
        assert!(matches!(
            listener.slot.try_send(Bytes::from_static(b"2")),
            Err(TrySendError::Full(_))
        ));
    }

    /// Тест проверяет, что `Drop` отправляет событие удаления
    #[tokio::test]
    async fn test_drop_sends_del_event() {
        let (events_tx, mut events_rx) = mpsc::channel(4);
        let (listener, rx) = Listener::new(Arc::from("t"));
        let id = listener.id;

        let sub = Subscription::new(id, listener.topic.clone(), rx, events_tx, TaskTracker::new());
        drop(sub);

        match events_rx.recv().await {
            Some(Event::Del(got)) => assert_eq!(got, id),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    /// Тест проверяет, что после `unsubscribe` событие удаления одно
    #[tokio::test]
    async fn test_unsubscribe_sends_single_del() {
        let (events_tx, mut events_rx) = mpsc::channel(4);
        let (listener, rx) = Listener::new(Arc::from("t"));

        let sub = Subscription::new(
            listener.id,
            listener.topic.clone(),
            rx,
            events_tx,
            TaskTracker::new(),
        );
        sub.unsubscribe().await;

        assert!(matches!(events_rx.recv().await, Some(Event::Del(_))));
        assert!(events_rx.try_recv().is_err());
    }

    /// Тест проверяет, что при полной очереди `Del` досылается из задачи,
    /// которую видит трекер брокера.
    #[tokio::test]
    async fn test_drop_with_full_queue_is_tracked() {
        let (events_tx, mut events_rx) = mpsc::channel(1);
        events_tx.try_send(Event::Del(ListenerId::next())).unwrap();

        let tasks = TaskTracker::new();
        let (listener, rx) = Listener::new(Arc::from("t"));
        let id = listener.id;
        let sub = Subscription::new(id, listener.topic.clone(), rx, events_tx, tasks.clone());
        drop(sub);
        assert_eq!(tasks.len(), 1);

        assert!(matches!(events_rx.recv().await, Some(Event::Del(_))));
        match events_rx.recv().await {
            Some(Event::Del(got)) => assert_eq!(got, id),
            other => panic!("unexpected event: {other:?}"),
        }

        tasks.close();
        tasks.wait().await;
    }

    /// Тест проверяет, что вне runtime `Del` при полной очереди не теряется.
    #[test]
    fn test_drop_outside_runtime_with_full_queue() {
        let (events_tx, mut events_rx) = mpsc::channel(1);
        events_tx.try_send(Event::Del(ListenerId::next())).unwrap();

        let (listener, rx) = Listener::new(Arc::from("t"));
        let id = listener.id;
        let sub = Subscription::new(id, listener.topic.clone(), rx, events_tx, TaskTracker::new());
        drop(sub);

        assert!(matches!(events_rx.blocking_recv(), Some(Event::Del(_))));
        match events_rx.blocking_recv() {
            Some(Event::Del(got)) => assert_eq!(got, id),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
