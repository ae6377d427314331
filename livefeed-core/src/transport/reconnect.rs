//! Retry behavior after backend failure or close
//!
//! Delays are plain fields so tests can inject near-zero values instead of
//! waiting out the production timings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-transport retry delays.
///
/// Long-poll reschedules after every response: a short delay on success, a
/// longer one on failure, with no attempt cap. WebSocket reconnects after a
/// fixed delay on every close, also uncapped. SSE performs no reconnect
/// unless `sse_retry_delay_ms` is set; the stock behavior flags the stream as
/// failed and leaves it there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectPolicy {
    pub poll_success_delay_ms: u64,
    pub poll_failure_delay_ms: u64,
    pub websocket_retry_delay_ms: u64,
    #[serde(default)]
    pub sse_retry_delay_ms: Option<u64>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            poll_success_delay_ms: 500,
            poll_failure_delay_ms: 1000,
            websocket_retry_delay_ms: 1000,
            sse_retry_delay_ms: None,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before the next long-poll request.
    pub fn poll_delay(&self, success: bool) -> Duration {
        if success {
            Duration::from_millis(self.poll_success_delay_ms)
        } else {
            Duration::from_millis(self.poll_failure_delay_ms)
        }
    }

    /// Delay before a WebSocket reconnect attempt.
    pub fn websocket_retry(&self) -> Duration {
        Duration::from_millis(self.websocket_retry_delay_ms)
    }

    /// Delay before an SSE reconnect attempt, if retries are enabled at all.
    pub fn sse_retry(&self) -> Option<Duration> {
        self.sse_retry_delay_ms.map(Duration::from_millis)
    }
}
