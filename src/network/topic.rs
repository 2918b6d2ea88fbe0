use std::borrow::Cow;

use hookbot_error::{bail, HookbotResult, StatusCode};
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;

/// Первый сегмент пути и всё, что за ним.
static TOPIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("/[^/]+/(.*)").unwrap_or_else(|e| unreachable!("topic regex: {e}")));

/// Тема запроса: всё после первого сегмента пути.
///
/// Совпадение с `/[^/]+/(.*)` без якорей, самое левое: `/pub/foo/bar`
/// даёт `foo/bar`, `/pub/` даёт пустую строку, `//x/y` даёт `y`. Если
/// совпадения нет, тема пустая. Захват останавливается на переводе строки.
pub fn topic_from_path(path: &str) -> &str {
    TOPIC_RE
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map_or("", |m| m.as_str())
}

/// Путь запроса после percent-декодирования.
///
/// По нему считается токен и из него берётся тема, так что `/pub/a%20b`
/// обслуживается как `/pub/a b`. Результат, не являющийся UTF-8, отклоняется.
pub fn decode_path(raw: &str) -> HookbotResult<Cow<'_, str>> {
    match percent_decode_str(raw).decode_utf8() {
        Ok(path) => Ok(path),
        Err(_) => bail!(
            StatusCode::InvalidArgs,
            "Request path is not valid UTF-8 once decoded: {}",
            raw
        ),
    }
}
