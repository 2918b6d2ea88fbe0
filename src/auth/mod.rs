//! Контроль доступа.
//!
//! - `hmac`: примитив HMAC-SHA1 и сравнение за постоянное время.
//! - `gate`: решение "пропустить / отказать" по заголовкам запроса.
//! - `middleware`: axum-слой поверх `gate`.
//! - `token`: офлайн-генерация токенов и URL доступа.

pub mod gate;
pub mod hmac;
pub mod middleware;
pub mod token;

pub use gate::{AuthGate, HUB_SIGNATURE};
pub use hmac::{hmac_hex, secure_eq};
pub use middleware::{body_read_failed, not_found, require_auth, NOT_FOUND_BODY};
pub use token::{is_subscribe_path, make_token, make_url, TokenRequest};
