use std::fmt;

use hookbot_error::{ensure, ConfigError, HookbotResult};

/// Переменная окружения с ключом для токенов доступа.
pub const KEY_ENV: &str = "HOOKBOT_KEY";
/// Переменная окружения с секретом подписи GitHub-вебхуков.
pub const GITHUB_SECRET_ENV: &str = "HOOKBOT_GITHUB_SECRET";

/// Секреты процесса: ключ токенов и секрет подписи вебхуков.
///
/// Создаются один раз и дальше только читаются, поэтому делятся через
/// `Arc<Secrets>` без синхронизации. `Debug` не печатает значения.
#[derive(Clone, PartialEq, Eq)]
pub struct Secrets {
    key: String,
    github_secret: String,
}

impl Secrets {
    /// Создаёт набор секретов. Оба значения обязаны быть непустыми.
    pub fn new(
        key: impl Into<String>,
        github_secret: impl Into<String>,
    ) -> HookbotResult<Self> {
        let key = key.into();
        let github_secret = github_secret.into();

        ensure!(
            !key.is_empty(),
            ConfigError::MissingSecret {
                name: KEY_ENV.to_string()
            }
        );
        ensure!(
            !github_secret.is_empty(),
            ConfigError::MissingSecret {
                name: GITHUB_SECRET_ENV.to_string()
            }
        );

        Ok(Self { key, github_secret })
    }

    /// Ключ для HMAC путей (`Authorization: Bearer/Basic`).
    pub fn key(&self) -> &[u8] {
        self.key.as_bytes()
    }

    /// Секрет для проверки `X-Hub-Signature`.
    pub fn github_secret(&self) -> &[u8] {
        self.github_secret.as_bytes()
    }
}

impl fmt::Debug for Secrets {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("key", &"<redacted>")
            .field("github_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use hookbot_error::StatusCode;

    use super::*;

    #[test]
    fn test_new_rejects_empty_key() {
        let err = Secrets::new("", "gh").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::MissingSecret);
        assert!(err.to_string().contains(KEY_ENV));
    }

    #[test]
    fn test_new_rejects_empty_github_secret() {
        let err = Secrets::new("k", "").unwrap_err();
        assert!(err.to_string().contains(GITHUB_SECRET_ENV));
    }

    #[test]
    fn test_debug_redacts_values() {
        let secrets = Secrets::new("super-key", "super-gh").unwrap();
        let debug = format!("{secrets:?}");
        assert!(!debug.contains("super-key"));
        assert!(!debug.contains("super-gh"));
        assert!(debug.contains("<redacted>"));
    }
}
