use std::sync::atomic::{AtomicBool, Ordering};

use tracing_appender::non_blocking::WorkerGuard;

/// Handle для управления lifecycle логирования.
///
/// Держит guard файлового writer'а: пока handle жив, фоновый поток
/// сбрасывает буфер в файл.
pub struct LoggingHandle {
    file_guard: Option<WorkerGuard>,
    shut_down: AtomicBool,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl LoggingHandle {
    pub fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self {
            file_guard,
            shut_down: AtomicBool::new(false),
        }
    }

    /// Включён ли файловый sink.
    pub fn has_file_sink(&self) -> bool {
        self.file_guard.is_some()
    }

    /// Явное завершение: сбрасывает буфер файлового sink.
    pub fn shutdown(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        self.shut_down.store(true, Ordering::SeqCst);
        if let Some(guard) = self.file_guard.take() {
            tracing::info!("Flushing file log sink");
            drop(guard);
        }
    }

    /// Файловый sink ещё не сброшен явным `shutdown`.
    fn pending_flush(&self) -> bool {
        !self.shut_down.load(Ordering::SeqCst) && self.file_guard.is_some()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для LoggingHandle
////////////////////////////////////////////////////////////////////////////////

impl Drop for LoggingHandle {
    fn drop(&mut self) {
        if self.pending_flush() {
            eprintln!("LoggingHandle dropped without shutdown(), flushing file sink");
        }
    }
}

impl std::fmt::Debug for LoggingHandle {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("LoggingHandle")
            .field("file_sink", &self.file_guard.is_some())
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_without_file_sink() {
        let handle = LoggingHandle::new(None);
        assert!(!handle.has_file_sink());
        handle.shutdown();
    }

    #[test]
    fn test_handle_with_file_sink() {
        let tmp = tempfile::tempdir().unwrap();
        let appender = tracing_appender::rolling::never(tmp.path(), "h.log");
        let (_writer, guard) = tracing_appender::non_blocking(appender);

        let handle = LoggingHandle::new(Some(guard));
        assert!(handle.has_file_sink());
        assert_eq!(format!("{handle:?}"), "LoggingHandle { file_sink: true }");
        handle.shutdown();
    }

    /// Тест проверяет, что после явного завершения Drop не предупреждает.
    #[test]
    fn test_finish_clears_pending_flush() {
        let tmp = tempfile::tempdir().unwrap();
        let appender = tracing_appender::rolling::never(tmp.path(), "h.log");
        let (_writer, guard) = tracing_appender::non_blocking(appender);

        let mut handle = LoggingHandle::new(Some(guard));
        assert!(handle.pending_flush());

        handle.finish();
        assert!(!handle.pending_flush());
        assert!(!handle.has_file_sink());
    }
}
