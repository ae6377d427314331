//! Channel identity and validation

pub mod validation;

pub use validation::{validate_channel_name, ChannelValidationError};
