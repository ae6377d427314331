//! Data models for livefeed

pub mod configuration;
pub mod message;

pub use configuration::*;
pub use message::*;
