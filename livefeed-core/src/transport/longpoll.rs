//! HTTP long-polling transport
//!
//! Each blocking GET against `/longpoll` yields exactly one message. The
//! next request is issued only after the previous one resolves, so there is
//! never more than one poll in flight. That chain is written as an explicit
//! two-state machine rather than a recursive reschedule.

use crate::models::{ConnectionState, TransportKind};
use crate::transport::{TransportBackend, TransportContext, TransportError, CHANNEL_HEADER};
use async_trait::async_trait;
use std::time::Duration;

/// A poll is either on the wire or waiting out its scheduled delay.
enum PollState {
    Requesting,
    Scheduled(Duration),
}

pub struct LongPollBackend;

#[async_trait]
impl TransportBackend for LongPollBackend {
    fn kind(&self) -> TransportKind {
        TransportKind::LongPoll
    }

    async fn run(self: Box<Self>, ctx: TransportContext) {
        let client = reqwest::Client::new();
        ctx.sink.transition(ConnectionState::Connecting);

        let mut state = PollState::Requesting;
        loop {
            if !ctx.live.is_live() {
                return;
            }
            state = match state {
                PollState::Requesting => match fetch_once(&client, &ctx).await {
                    Ok(body) => {
                        ctx.sink.transition(ConnectionState::Active);
                        ctx.sink.deliver(&body);
                        PollState::Scheduled(ctx.config.reconnect.poll_delay(true))
                    }
                    Err(e) => {
                        tracing::warn!(transport = "longpoll", error = %e, "poll request failed");
                        ctx.sink.transition(ConnectionState::Reconnecting);
                        PollState::Scheduled(ctx.config.reconnect.poll_delay(false))
                    }
                },
                PollState::Scheduled(delay) => {
                    tokio::time::sleep(delay).await;
                    PollState::Requesting
                }
            };
        }
    }
}

/// Issue one blocking poll and return its body.
async fn fetch_once(
    client: &reqwest::Client,
    ctx: &TransportContext,
) -> Result<String, TransportError> {
    let response = client
        .get(ctx.config.longpoll_endpoint())
        .bearer_auth(&ctx.config.auth_token)
        .header(CHANNEL_HEADER, &ctx.config.channel)
        .send()
        .await
        .map_err(|e| TransportError::connect(TransportKind::LongPoll, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::stream(
            TransportKind::LongPoll,
            format!("server returned {}", status),
        ));
    }

    response
        .text()
        .await
        .map_err(|e| TransportError::stream(TransportKind::LongPoll, e))
}
