//! Error types for report delivery

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("SLACK_WEBHOOK_URL is missing. Add it to .env.")]
    MissingWebhookUrl,

    #[error("Slack send failed: {status} {body}")]
    SendFailed { status: u16, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;
