//! Channel name validation
//!
//! The channel name travels as the `X-Channel-Name` header on HTTP requests
//! and as a query parameter on the WebSocket handshake, so it is restricted
//! to a conservative character set before any transport is started.

use thiserror::Error;

/// Errors that can occur during channel validation
#[derive(Error, Debug)]
pub enum ChannelValidationError {
    #[error("Channel name is empty")]
    Empty,

    #[error("Channel name is too long (max 64 characters)")]
    TooLong,

    #[error("Channel name must start with a letter or number")]
    InvalidStart,

    #[error("Channel name contains invalid characters (only letters, numbers, hyphens, and underscores allowed)")]
    InvalidCharacters,
}

/// Validate a channel name according to the naming convention
pub fn validate_channel_name(name: &str) -> Result<(), ChannelValidationError> {
    if name.is_empty() {
        return Err(ChannelValidationError::Empty);
    }

    if name.len() > 64 {
        return Err(ChannelValidationError::TooLong);
    }

    let first_char = name.chars().next().unwrap();
    if !first_char.is_ascii_alphabetic() && !first_char.is_ascii_digit() {
        return Err(ChannelValidationError::InvalidStart);
    }

    for ch in name.chars() {
        if !ch.is_ascii_alphabetic() && !ch.is_ascii_digit() && ch != '-' && ch != '_' {
            return Err(ChannelValidationError::InvalidCharacters);
        }
    }

    Ok(())
}

/// Check if a channel name is valid (convenience function)
pub fn is_valid_channel_name(name: &str) -> bool {
    validate_channel_name(name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_channel_names() {
        assert!(is_valid_channel_name("test-common"));
        assert!(is_valid_channel_name("release_feed"));
        assert!(is_valid_channel_name("channel123"));
        assert!(is_valid_channel_name("a"));
    }

    #[test]
    fn test_invalid_channel_names() {
        assert!(matches!(
            validate_channel_name(""),
            Err(ChannelValidationError::Empty)
        ));
        assert!(matches!(
            validate_channel_name(&"a".repeat(65)),
            Err(ChannelValidationError::TooLong)
        ));
        assert!(matches!(
            validate_channel_name("-leading-dash"),
            Err(ChannelValidationError::InvalidStart)
        ));
        assert!(matches!(
            validate_channel_name("has space"),
            Err(ChannelValidationError::InvalidCharacters)
        ));
        assert!(matches!(
            validate_channel_name("has@symbol"),
            Err(ChannelValidationError::InvalidCharacters)
        ));
    }
}
