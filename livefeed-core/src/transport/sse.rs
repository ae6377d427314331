//! Server-Sent Events transport
//!
//! Holds one long-lived streaming GET against `/sse` and forwards each event
//! payload verbatim. On error the stream is flagged as failed; by default no
//! reconnect is attempted (see [`ReconnectPolicy::sse_retry`]), matching the
//! stock client behavior.
//!
//! [`ReconnectPolicy::sse_retry`]: crate::transport::reconnect::ReconnectPolicy::sse_retry

use crate::models::{ConnectionState, TransportKind};
use crate::transport::{TransportBackend, TransportContext, TransportError, CHANNEL_HEADER};
use async_trait::async_trait;
use bytes::BytesMut;
use futures_util::StreamExt;

pub struct SseBackend;

#[async_trait]
impl TransportBackend for SseBackend {
    fn kind(&self) -> TransportKind {
        TransportKind::Sse
    }

    async fn run(self: Box<Self>, ctx: TransportContext) {
        let client = reqwest::Client::new();
        loop {
            ctx.sink.transition(ConnectionState::Connecting);
            match stream_events(&client, &ctx).await {
                Ok(()) => tracing::info!(transport = "sse", "event stream closed by server"),
                Err(e) => tracing::warn!(transport = "sse", error = %e, "event stream failed"),
            }
            ctx.sink.transition(ConnectionState::Failed);

            let Some(delay) = ctx.config.reconnect.sse_retry() else {
                return;
            };
            tokio::time::sleep(delay).await;
            if !ctx.live.is_live() {
                return;
            }
            ctx.sink.transition(ConnectionState::Reconnecting);
        }
    }
}

/// Open the stream and pump events into the sink until it ends.
async fn stream_events(
    client: &reqwest::Client,
    ctx: &TransportContext,
) -> Result<(), TransportError> {
    let response = client
        .get(ctx.config.sse_endpoint())
        .bearer_auth(&ctx.config.auth_token)
        .header(CHANNEL_HEADER, &ctx.config.channel)
        .send()
        .await
        .map_err(|e| TransportError::connect(TransportKind::Sse, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::connect(
            TransportKind::Sse,
            format!("server returned {}", status),
        ));
    }

    tracing::debug!(transport = "sse", channel = %ctx.config.channel, "stream established");
    ctx.sink.transition(ConnectionState::Active);

    let mut parser = EventStreamParser::default();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| TransportError::stream(TransportKind::Sse, e))?;
        for payload in parser.push(&chunk) {
            ctx.sink.deliver(&payload);
        }
    }
    Ok(())
}

/// Incremental `text/event-stream` framing.
///
/// Events are terminated by a blank line; `data:` lines accumulate into the
/// event payload (joined with newlines when there are several). Comment,
/// `event:`, `id:`, and `retry:` lines carry no payload for this protocol
/// and are skipped. Bytes are buffered across chunk boundaries so a frame
/// split mid-line survives intact.
#[derive(Debug, Default)]
struct EventStreamParser {
    pending: BytesMut,
    data: Vec<String>,
}

impl EventStreamParser {
    /// Feed one chunk, returning the payloads of any events it completed.
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let raw = self.pending.split_to(pos + 1);
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\r', '\n']);

            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                    self.data.clear();
                }
            } else if let Some(rest) = line.strip_prefix("data:") {
                self.data.push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
            }
        }
        events
    }
}
