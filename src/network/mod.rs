//! HTTP-поверхность: публикация, подписка по WebSocket, `/status`.

pub mod publish;
pub mod server;
pub mod state;
pub mod subscribe;
pub mod topic;

pub use publish::publish_handler;
pub use server::{build_router, serve, serve_listener};
pub use state::AppState;
pub use subscribe::{run_subscription, subscribe_handler};
pub use topic::{decode_path, topic_from_path};
