//! Transport selection and lifecycle
//!
//! The manager owns at most one backend task at a time. Selecting a new kind
//! always finishes tearing the previous backend down before the replacement
//! starts, which is what keeps the buffer free of interleaved messages from
//! two transports.

use crate::buffer::MessageBuffer;
use crate::models::{Configuration, ConnectionState, InboundMessage, TransportKind};
use crate::transport::{create_backend, EventSink, Liveness, TransportContext};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;

struct ActiveTransport {
    kind: TransportKind,
    live: Liveness,
    task: JoinHandle<()>,
}

/// Owns the active transport and exposes the uniform feed to the caller.
pub struct TransportManager {
    config: Arc<Configuration>,
    buffer: Arc<MessageBuffer>,
    status: Arc<watch::Sender<ConnectionState>>,
    active: Mutex<Option<ActiveTransport>>,
}

impl TransportManager {
    /// Create a manager; no transport is active until [`select`] is called.
    ///
    /// [`select`]: TransportManager::select
    pub fn new(config: Configuration) -> Self {
        let buffer = Arc::new(MessageBuffer::new(config.buffer_policy));
        let (status, _) = watch::channel(ConnectionState::Inactive);
        Self {
            config: Arc::new(config),
            buffer,
            status: Arc::new(status),
            active: Mutex::new(None),
        }
    }

    /// Switch the active transport.
    ///
    /// Any running backend is fully stopped first. `None` deactivates with no
    /// replacement, and selecting the kind that is already active acts as a
    /// toggle: the backend is stopped and nothing is started in its place.
    pub async fn select(&self, kind: Option<TransportKind>) {
        let mut active = self.active.lock().await;
        let previous_kind = active.as_ref().map(|a| a.kind);
        if let Some(previous) = active.take() {
            self.teardown(previous).await;
        }

        let Some(kind) = kind else {
            return;
        };
        if previous_kind == Some(kind) {
            tracing::info!(transport = %kind, "transport toggled off");
            return;
        }

        let live = Liveness::new();
        let sink = EventSink::new(
            kind,
            self.config.codec,
            live.clone(),
            Arc::clone(&self.buffer),
            Arc::clone(&self.status),
        );
        let ctx = TransportContext {
            config: Arc::clone(&self.config),
            sink,
            live: live.clone(),
        };
        let task = tokio::spawn(create_backend(kind).run(ctx));
        tracing::info!(transport = %kind, channel = %self.config.channel, "transport selected");
        *active = Some(ActiveTransport { kind, live, task });
    }

    /// Stop the active transport, if any.
    pub async fn stop(&self) {
        self.select(None).await;
    }

    /// Kind of the currently active transport.
    pub async fn active_kind(&self) -> Option<TransportKind> {
        self.active.lock().await.as_ref().map(|a| a.kind)
    }

    /// Connection-state signal for the active transport.
    pub fn status(&self) -> watch::Receiver<ConnectionState> {
        self.status.subscribe()
    }

    /// Live feed of inbound messages from whichever transport is active.
    pub fn subscribe(&self) -> broadcast::Receiver<InboundMessage> {
        self.buffer.subscribe()
    }

    /// Snapshot of the buffered history in arrival order.
    pub fn messages(&self) -> Vec<InboundMessage> {
        self.buffer.snapshot()
    }

    /// Buffered history delivered by one transport.
    pub fn messages_for(&self, kind: TransportKind) -> Vec<InboundMessage> {
        self.buffer.for_transport(kind)
    }

    /// Configuration this manager was built with.
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    async fn teardown(&self, previous: ActiveTransport) {
        // Revoke first: from here on the old backend cannot deliver anything,
        // even if its task is still winding down or a retry timer fires.
        previous.live.revoke();
        previous.task.abort();
        let _ = previous.task.await;

        self.buffer.on_transport_stopped();
        self.status.send_if_modified(|state| {
            if *state == ConnectionState::Inactive {
                false
            } else {
                *state = ConnectionState::Inactive;
                true
            }
        });
        tracing::info!(transport = %previous.kind, "transport deactivated");
    }
}
