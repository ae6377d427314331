//! Fire-and-forget outbound publishing
//!
//! Publishing is independent of the receive path: it works the same whether
//! or not any transport is active, and a failed publish is reported to the
//! caller once, never retried.

use crate::models::Configuration;
use crate::transport::CHANNEL_HEADER;
use chrono::Utc;
use reqwest::StatusCode;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Publish failure, split by where it happened: the request never completed,
/// or the server answered and signaled failure.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publish request did not complete: {0}")]
    Network(#[from] reqwest::Error),
    #[error("publish rejected with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Wire shape of a published message
#[derive(Serialize)]
struct PublishPayload<'a> {
    message: &'a str,
    #[serde(rename = "timeStamp")]
    time_stamp: String,
}

/// One-shot message publisher for the configured channel.
pub struct Publisher {
    client: reqwest::Client,
    config: Arc<Configuration>,
}

impl Publisher {
    pub fn new(config: Arc<Configuration>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// POST one message, returning the server's acknowledgement body.
    pub async fn publish(&self, text: &str) -> Result<String, PublishError> {
        let payload = PublishPayload {
            message: text,
            time_stamp: Utc::now().to_rfc3339(),
        };

        let response = self
            .client
            .post(self.config.publish_endpoint())
            .bearer_auth(&self.config.auth_token)
            .header(CHANNEL_HEADER, &self.config.channel)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(channel = %self.config.channel, "message published");
            Ok(response.text().await.unwrap_or_default())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(PublishError::Rejected { status, body })
        }
    }
}
