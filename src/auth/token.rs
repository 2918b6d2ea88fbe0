use hookbot_error::{ConfigError, HookbotResult};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use super::hmac_hex;

static SUBSCRIBE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^(/unsafe)?/sub/").unwrap_or_else(|e| unreachable!("subscribe regex: {e}"))
});

/// Является ли путь путём подписки: `^(/unsafe)?/sub/`.
pub fn is_subscribe_path(path: &str) -> bool {
    SUBSCRIBE_RE.is_match(path)
}

/// Голый токен доступа к пути.
pub fn make_token(
    key: &[u8],
    path: &str,
) -> String {
    hmac_hex(key, path.as_bytes())
}

/// Полный URL с токеном в качестве учётных данных:
/// `scheme://<token>@host[:port]/path`.
///
/// Для путей подписки схема `ws`/`wss`, для остальных `http`/`https`;
/// защищённый вариант выбирается, если `base` использует `https` или `wss`.
pub fn make_url(
    key: &[u8],
    base: &Url,
    path: &str,
) -> HookbotResult<String> {
    let host = base.host_str().ok_or_else(|| ConfigError::Invalid {
        field: "url-base".to_string(),
        reason: format!("'{base}' has no host"),
    })?;
    let secure = matches!(base.scheme(), "https" | "wss");
    let scheme = match (is_subscribe_path(path), secure) {
        (true, true) => "wss",
        (true, false) => "ws",
        (false, true) => "https",
        (false, false) => "http",
    };
    let authority = match base.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    Ok(format!(
        "{scheme}://{token}@{authority}{path}",
        token = make_token(key, path)
    ))
}

/// Запрос на генерацию токенов (подкоманда `make-token`).
#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub paths: Vec<String>,
    /// Печатать только токены
    pub bare: bool,
    pub url_base: Url,
}

impl TokenRequest {
    /// Строка вывода на каждый путь.
    pub fn render(
        &self,
        key: &[u8],
    ) -> HookbotResult<Vec<String>> {
        self.paths
            .iter()
            .map(|path| {
                if self.bare {
                    Ok(make_token(key, path))
                } else {
                    make_url(key, &self.url_base, path)
                }
            })
            .collect()
    }
}
