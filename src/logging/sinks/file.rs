use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling::daily};
use tracing_subscriber::{fmt, registry::LookupSpan, Layer};

use crate::logging::config::FileSinkConfig;

/// Файловый layer с ежедневной ротацией.
///
/// Guard нужно держать до конца работы процесса, иначе хвост буфера
/// не попадёт в файл.
pub fn layer_with_config<S>(
    file: &FileSinkConfig,
) -> (Box<dyn Layer<S> + Send + Sync>, WorkerGuard)
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let file_appender = daily(&file.dir, &file.prefix);
    let (non_blocking_writer, guard) = non_blocking(file_appender);

    let layer = fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking_writer);

    (Box::new(layer), guard)
}

#[cfg(test)]
mod tests {
    use tracing::info;
    use tracing_subscriber::{prelude::*, registry::Registry};

    use super::*;

    /// Тест проверяет, что запись через файловый layer создаёт файл в
    /// указанном каталоге.
    #[test]
    fn test_file_layer_writes_into_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = FileSinkConfig {
            dir: tmp.path().to_path_buf(),
            prefix: "test.log".to_string(),
        };

        let (layer, guard) = layer_with_config::<Registry>(&cfg);
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            info!("file sink smoke test");
        });
        drop(guard);

        let entries: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert!(!entries.is_empty());
    }
}
