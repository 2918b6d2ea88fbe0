//! Конфигурация hookbot.
//!
//! - `settings`: настраиваемые параметры сервера и брокера (файл +
//!   переменные окружения `HOOKBOT_*`).
//! - `secrets`: неизменяемые секреты, создаются один раз при старте процесса
//!   и передаются в `AuthGate` и генератор токенов.

pub mod secrets;
pub mod settings;

pub use secrets::Secrets;
pub use settings::{BrokerSettings, Settings};
