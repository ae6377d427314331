//! Ordered record of received messages with live fan-out
//!
//! The buffer is append-only while a transport is active: entries are stored
//! in arrival order and simultaneously broadcast to live subscribers.

use crate::models::{InboundMessage, TransportKind};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::sync::broadcast;

/// Message history retention across transport switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BufferPolicy {
    /// One shared history, cleared whenever the active transport is switched
    /// or stopped
    #[default]
    ClearOnSwitch,
    /// History survives a backend's own lifecycle; a per-transport view stays
    /// available after switching away
    RetainPerBackend,
}

/// Append-only message history with broadcast distribution to subscribers.
pub struct MessageBuffer {
    policy: BufferPolicy,
    entries: Mutex<Vec<InboundMessage>>,
    sender: broadcast::Sender<InboundMessage>,
}

impl MessageBuffer {
    /// Create an empty buffer with the given retention policy.
    pub fn new(policy: BufferPolicy) -> Self {
        let (sender, _) = broadcast::channel(1024);
        Self {
            policy,
            entries: Mutex::new(Vec::new()),
            sender,
        }
    }

    /// Append a message and fan it out to live subscribers.
    pub fn push(&self, message: InboundMessage) {
        let _ = self.sender.send(message.clone()); // no receivers is fine
        self.entries.lock().unwrap().push(message);
    }

    /// Get a receiver for live updates.
    pub fn subscribe(&self) -> broadcast::Receiver<InboundMessage> {
        self.sender.subscribe()
    }

    /// Snapshot of the full history in arrival order.
    pub fn snapshot(&self) -> Vec<InboundMessage> {
        self.entries.lock().unwrap().clone()
    }

    /// Snapshot of the history delivered by one transport.
    pub fn for_transport(&self, kind: TransportKind) -> Vec<InboundMessage> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.transport == kind)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    /// Drop all history.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// Retention policy this buffer was created with.
    pub fn policy(&self) -> BufferPolicy {
        self.policy
    }

    /// Apply the retention policy when the active transport goes away.
    pub(crate) fn on_transport_stopped(&self) {
        if self.policy == BufferPolicy::ClearOnSwitch {
            self.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PayloadCodec;

    fn message(kind: TransportKind, body: &str) -> InboundMessage {
        InboundMessage::decode(kind, body, PayloadCodec::RawText)
    }

    #[test]
    fn test_push_preserves_arrival_order() {
        let buffer = MessageBuffer::new(BufferPolicy::ClearOnSwitch);
        buffer.push(message(TransportKind::Sse, "first"));
        buffer.push(message(TransportKind::Sse, "second"));

        let bodies: Vec<String> = buffer.snapshot().into_iter().map(|m| m.body).collect();
        assert_eq!(bodies, vec!["first", "second"]);
    }

    #[test]
    fn test_clear_on_switch_drops_history_when_transport_stops() {
        let buffer = MessageBuffer::new(BufferPolicy::ClearOnSwitch);
        buffer.push(message(TransportKind::WebSocket, "a"));
        buffer.on_transport_stopped();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_retain_per_backend_keeps_history_when_transport_stops() {
        let buffer = MessageBuffer::new(BufferPolicy::RetainPerBackend);
        buffer.push(message(TransportKind::WebSocket, "a"));
        buffer.push(message(TransportKind::LongPoll, "b"));
        buffer.on_transport_stopped();

        assert_eq!(buffer.len(), 2);
        let ws_only = buffer.for_transport(TransportKind::WebSocket);
        assert_eq!(ws_only.len(), 1);
        assert_eq!(ws_only[0].body, "a");
    }

    #[tokio::test]
    async fn test_subscribers_receive_pushed_messages() {
        let buffer = MessageBuffer::new(BufferPolicy::ClearOnSwitch);
        let mut rx = buffer.subscribe();
        buffer.push(message(TransportKind::LongPoll, "live"));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.body, "live");
    }
}
