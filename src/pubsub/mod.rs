//! Подсистема Publish–Subscribe.
//!
//! - `broker`: координатор, владеющий реестром слушателей, и его handle.
//! - `delivery`: одна попытка доставки с ограниченным временем.
//! - `listener`: слушатель, его слот доставки и подписка.
//! - `message`: публикуемое событие и квитанция рассылки.

pub mod broker;
pub mod delivery;
pub mod listener;
pub mod message;

pub use broker::{Broker, BrokerConfig, BrokerStats};
pub use delivery::{deliver, DeliveryOutcome, DEFAULT_DELIVERY_TIMEOUT};
pub(crate) use listener::Listener;
pub use listener::{ListenerId, Subscription, SLOT_CAPACITY};
pub use message::{DispatchReceipt, Message};
