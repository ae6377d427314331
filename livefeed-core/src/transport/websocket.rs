//! WebSocket transport
//!
//! Full-duplex socket against `/websocket?channel=<channel>`. Every received
//! text frame becomes one inbound message. On close the backend reconnects
//! after a fixed delay, but only while it is still wanted: the liveness
//! check before each attempt is what keeps a stop followed by a rapid
//! restart from leaking a duplicate socket.

use crate::models::{ConnectionState, TransportKind};
use crate::transport::{TransportBackend, TransportContext};
use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub struct WebSocketBackend;

#[async_trait]
impl TransportBackend for WebSocketBackend {
    fn kind(&self) -> TransportKind {
        TransportKind::WebSocket
    }

    async fn run(self: Box<Self>, ctx: TransportContext) {
        let url = match ctx.config.websocket_endpoint() {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(transport = "websocket", error = %e, "invalid endpoint");
                ctx.sink.transition(ConnectionState::Failed);
                return;
            }
        };

        ctx.sink.transition(ConnectionState::Connecting);
        loop {
            match connect_async(url.as_str()).await {
                Ok((stream, _)) => {
                    tracing::debug!(
                        transport = "websocket",
                        channel = %ctx.config.channel,
                        "socket connected"
                    );
                    ctx.sink.transition(ConnectionState::Active);
                    read_frames(stream, &ctx).await;
                }
                Err(e) => {
                    tracing::warn!(transport = "websocket", error = %e, "connect failed");
                    ctx.sink.transition(ConnectionState::Failed);
                }
            }

            if !ctx.live.is_live() {
                return;
            }
            ctx.sink.transition(ConnectionState::Reconnecting);
            tokio::time::sleep(ctx.config.reconnect.websocket_retry()).await;
            if !ctx.live.is_live() {
                return;
            }
        }
    }
}

/// Pump frames into the sink until the socket closes or errors.
async fn read_frames(
    mut stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    ctx: &TransportContext,
) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => ctx.sink.deliver(&text),
            Ok(WsMessage::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => ctx.sink.deliver(&text),
                Err(_) => {
                    tracing::warn!(transport = "websocket", "dropping non-utf8 binary frame");
                }
            },
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {} // ping/pong handled by tungstenite
            Err(e) => {
                tracing::warn!(transport = "websocket", error = %e, "socket read error");
                break;
            }
        }
    }
}
