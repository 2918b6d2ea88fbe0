/// Access control: HMAC tokens, webhook signatures, axum middleware.
pub mod auth;
/// Settings and process secrets.
pub mod config;
/// Structured logging (formats, filters, sinks).
pub mod logging;
/// HTTP surface: publish, WebSocket subscribe, status.
pub mod network;
/// Topic broker: coordinator, delivery workers, subscriptions.
pub mod pubsub;
/// Collaborator interface for third-party webhook routers.
pub mod routers;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// HMAC primitive, request gate and token tool.
pub use auth::{hmac_hex, is_subscribe_path, make_token, make_url, AuthGate, TokenRequest};
/// Settings and secrets.
pub use config::{BrokerSettings, Secrets, Settings};
/// Errors and result type.
pub use hookbot_error::{HookbotResult, StackError, StatusCode};
/// Logging bootstrap.
pub use logging::{init_logging, LoggingConfig, LoggingHandle};
/// Server entry points.
pub use network::{build_router, serve, serve_listener, topic_from_path, AppState};
/// Broker API.
pub use pubsub::{Broker, BrokerConfig, BrokerStats, DeliveryOutcome, Message, Subscription};
/// Collaborator traits.
pub use routers::{Publisher, RouterRegistry, WebhookRouter};
