use thiserror::Error;

/// Webhook delivery errors
#[derive(Debug, Error)]
pub enum WebhookError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Webhook endpoint rejected the payload
    #[error("Webhook returned {status}: {body}")]
    Api { status: u16, body: String },
}
