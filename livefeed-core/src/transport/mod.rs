//! Transport backends and their shared plumbing
//!
//! A backend owns exactly one delivery mechanism for the lifetime of a
//! selection. The manager hands it a [`TransportContext`] and drives it on a
//! dedicated task; teardown revokes the context's liveness flag before the
//! task is cancelled, so a backend that is mid-callback or mid-retry can
//! never deliver into a session that no longer wants it.

pub mod longpoll;
pub mod manager;
pub mod reconnect;
pub mod sse;
pub mod websocket;

use crate::buffer::MessageBuffer;
use crate::models::{Configuration, ConnectionState, InboundMessage, PayloadCodec, TransportKind};
use async_trait::async_trait;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

/// Header carrying the channel name on SSE, long-poll, and publish requests
pub const CHANNEL_HEADER: &str = "X-Channel-Name";

/// Transport-level failures.
///
/// These never escape to the caller as hard errors; they are logged and
/// folded into the connection-state signal, with the reconnect policy
/// deciding what happens next.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to establish {transport} transport: {reason}")]
    Connect { transport: TransportKind, reason: String },
    #[error("{transport} stream error: {reason}")]
    Stream { transport: TransportKind, reason: String },
}

impl TransportError {
    pub(crate) fn connect(transport: TransportKind, reason: impl Display) -> Self {
        Self::Connect {
            transport,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn stream(transport: TransportKind, reason: impl Display) -> Self {
        Self::Stream {
            transport,
            reason: reason.to_string(),
        }
    }
}

/// Revocable "still wanted" flag shared between a backend task and the
/// manager that owns it.
///
/// Every deferred action a backend takes (delivering a message, flipping the
/// state, reconnecting after a scheduled delay) checks this flag first, which
/// is what makes `stop` safe against late callbacks.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn revoke(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_live(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Gated outlet for everything a backend emits.
///
/// Once the liveness flag is revoked the sink silently drops deliveries, so
/// a torn-down backend cannot grow the buffer or move the state signal.
#[derive(Clone)]
pub struct EventSink {
    kind: TransportKind,
    codec: PayloadCodec,
    live: Liveness,
    buffer: Arc<MessageBuffer>,
    status: Arc<watch::Sender<ConnectionState>>,
}

impl EventSink {
    pub(crate) fn new(
        kind: TransportKind,
        codec: PayloadCodec,
        live: Liveness,
        buffer: Arc<MessageBuffer>,
        status: Arc<watch::Sender<ConnectionState>>,
    ) -> Self {
        Self {
            kind,
            codec,
            live,
            buffer,
            status,
        }
    }

    /// Decode a raw payload and append it to the buffer.
    pub fn deliver(&self, payload: &str) {
        if !self.live.is_live() {
            return;
        }
        tracing::trace!(transport = %self.kind, bytes = payload.len(), "message received");
        self.buffer
            .push(InboundMessage::decode(self.kind, payload, self.codec));
    }

    /// Move the connection-state signal, deduplicating repeats.
    pub fn transition(&self, next: ConnectionState) {
        if !self.live.is_live() {
            return;
        }
        let changed = self.status.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
        if changed {
            tracing::debug!(transport = %self.kind, state = %next, "connection state changed");
        }
    }
}

/// Everything a backend needs to run: endpoints and credentials from the
/// configuration, the gated event sink, and the liveness flag it must check
/// before any deferred action.
pub struct TransportContext {
    pub config: Arc<Configuration>,
    pub sink: EventSink,
    pub live: Liveness,
}

/// One delivery mechanism for the live message feed.
///
/// `run` drives the transport until it gives up (per the reconnect policy)
/// or the owning task is cancelled. Implementations report progress only
/// through the context's sink.
#[async_trait]
pub trait TransportBackend: Send {
    /// Transport identifier used in logs
    fn kind(&self) -> TransportKind;

    /// Drive the transport until completion or cancellation.
    async fn run(self: Box<Self>, ctx: TransportContext);
}

/// Create a backend instance for the requested kind.
pub fn create_backend(kind: TransportKind) -> Box<dyn TransportBackend> {
    match kind {
        TransportKind::Sse => Box::new(sse::SseBackend),
        TransportKind::WebSocket => Box::new(websocket::WebSocketBackend),
        TransportKind::LongPoll => Box::new(longpoll::LongPollBackend),
    }
}
