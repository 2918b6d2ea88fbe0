use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;

/// Таймаут доставки по умолчанию.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(1);

/// Итог одной попытки доставки.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Слот принял тело
    Delivered,
    /// Слот был занят весь таймаут, тело отброшено
    TimedOut,
    /// Слушатель закрыт
    ListenerGone,
}

/// Пытается положить тело в слот слушателя за время `timeout`.
///
/// Ошибок нет: просроченная доставка молча отбрасывается.
pub async fn deliver(
    slot: &mpsc::Sender<Bytes>,
    body: Bytes,
    timeout: Duration,
) -> DeliveryOutcome {
    match tokio::time::timeout(timeout, slot.send(body)).await {
        Ok(Ok(())) => DeliveryOutcome::Delivered,
        Ok(Err(_)) => DeliveryOutcome::ListenerGone,
        Err(_) => DeliveryOutcome::TimedOut,
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deliver_into_empty_slot() {
        let (tx, mut rx) = mpsc::channel(1);

        let outcome = deliver(&tx, Bytes::from_static(b"a"), DEFAULT_DELIVERY_TIMEOUT).await;

        assert_eq!(outcome, DeliveryOutcome::Delivered);
        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"a"));
    }

    /// Тест проверяет, что занятый слот даёт отброс ровно через таймаут
    #[tokio::test(start_paused = true)]
    async fn test_deliver_times_out_on_full_slot() {
        let (tx, mut rx) = mpsc::channel(1);
        tx.try_send(Bytes::from_static(b"first")).unwrap();

        let start = Instant::now();
        let outcome = deliver(&tx, Bytes::from_static(b"second"), DEFAULT_DELIVERY_TIMEOUT).await;

        assert_eq!(outcome, DeliveryOutcome::TimedOut);
        assert!(start.elapsed() >= DEFAULT_DELIVERY_TIMEOUT);
        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"first"));
        assert!(rx.try_recv().is_err());
    }

    /// Тест проверяет, что слот, освобождённый до таймаута, принимает тело
    #[tokio::test(start_paused = true)]
    async fn test_deliver_succeeds_when_drained_in_time() {
        let (tx, mut rx) = mpsc::channel(1);
        tx.try_send(Bytes::from_static(b"first")).unwrap();

        let reader = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            let first = rx.recv().await.unwrap();
            let second = rx.recv().await.unwrap();
            (first, second)
        });

        let outcome = deliver(&tx, Bytes::from_static(b"second"), DEFAULT_DELIVERY_TIMEOUT).await;
        assert_eq!(outcome, DeliveryOutcome::Delivered);

        let (first, second) = reader.await.unwrap();
        assert_eq!(first, Bytes::from_static(b"first"));
        assert_eq!(second, Bytes::from_static(b"second"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deliver_to_closed_listener() {
        let (tx, rx) = mpsc::channel::<Bytes>(1);
        drop(rx);

        let outcome = deliver(&tx, Bytes::from_static(b"x"), DEFAULT_DELIVERY_TIMEOUT).await;
        assert_eq!(outcome, DeliveryOutcome::ListenerGone);
    }
}
