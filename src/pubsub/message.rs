use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::oneshot;

/// Одно опубликованное событие: тема и неизменяемое тело.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub topic: Arc<str>,
    pub body: Bytes,
}

/// Квитанция публикации.
///
/// Срабатывает, когда координатор запустил доставку всем слушателям темы.
/// Это сигнал о завершении рассылки, а не о доставке: ни один слушатель
/// не ожидается.
#[derive(Debug)]
pub struct DispatchReceipt {
    done: oneshot::Receiver<()>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Message {
    pub fn new(
        topic: impl Into<Arc<str>>,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            topic: topic.into(),
            body: body.into(),
        }
    }
}

impl DispatchReceipt {
    pub(crate) fn new(done: oneshot::Receiver<()>) -> Self {
        Self { done }
    }

    /// Ожидает завершения рассылки.
    ///
    /// Возвращает `false`, если брокер остановился раньше, чем событие
    /// было обработано.
    pub async fn dispatched(self) -> bool {
        self.done.await.is_ok()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
