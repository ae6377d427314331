//! Logging service

use crate::models::LogLevel;
use tracing_subscriber::EnvFilter;

/// Initialize logging with the specified level.
///
/// `RUST_LOG` takes precedence over the configured level when set.
pub fn init_logging(level: LogLevel) -> Result<(), Box<dyn std::error::Error>> {
    let level = match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("livefeed={level},livefeed_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;

    static INIT: Once = Once::new();

    #[test]
    fn test_logging_initialization() {
        // init() panics if a global subscriber is already set, so only the
        // first call in the process may use it
        INIT.call_once(|| {
            let _ = init_logging(LogLevel::Info);
        });
    }
}
