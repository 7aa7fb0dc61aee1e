//! Delivery of the composed payload

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::{ReportError, ReportResult};
use crate::message::Payload;

/// Final stage of the pipeline
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, payload: &Payload) -> ReportResult<()>;
}

/// Posts to a Slack incoming webhook. No retries; the transport's default
/// timeout applies.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> ReportResult<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, payload: &Payload) -> ReportResult<()> {
        debug!("Posting {} block(s) to webhook", payload.blocks.len());

        let response = self.client.post(&self.url).json(payload).send().await?;
        let status = response.status();

        if status.is_success() {
            info!("Slack notification sent.");
            return Ok(());
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read webhook response body: {}", e);
                String::new()
            }
        };
        Err(ReportError::SendFailed {
            status: status.as_u16(),
            body,
        })
    }
}

/// Prints the payload as pretty JSON instead of sending it
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunNotifier;

#[async_trait]
impl Notifier for DryRunNotifier {
    async fn send(&self, payload: &Payload) -> ReportResult<()> {
        println!("{}", serde_json::to_string_pretty(payload)?);
        info!("Dry run, payload not sent.");
        Ok(())
    }
}
