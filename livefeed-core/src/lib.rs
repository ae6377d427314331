//! # Livefeed Core Library
//!
//! Client-side multi-transport streaming core. A caller selects one of three
//! interchangeable delivery mechanisms (Server-Sent Events, WebSocket, or HTTP
//! long-polling) and observes a single ordered message feed plus a
//! connection-state signal, regardless of which transport is active.

pub mod buffer;
pub mod channel;
pub mod models;
pub mod publish;
pub mod services;
pub mod transport;

// Re-export commonly used types
pub use buffer::{BufferPolicy, MessageBuffer};
pub use models::*;
pub use publish::{PublishError, Publisher};
pub use transport::manager::TransportManager;
pub use transport::reconnect::ReconnectPolicy;
