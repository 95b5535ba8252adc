use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde_json::json;

use crate::WebhookError;

/// Incoming-webhook client bound to a single destination URL
#[derive(Clone)]
pub struct WebhookClient {
    client: Client,
    url: String,
}

impl WebhookClient {
    /// Create a new webhook client
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Send a text message
    pub async fn send_message(&self, content: &str) -> Result<(), WebhookError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&json!({ "content": content }))
            .send()
            .await?;

        Self::check_status(resp).await
    }

    /// Send a message with a file attached
    pub async fn send_file(
        &self,
        content: &str,
        data: &[u8],
        file_name: &str,
    ) -> Result<(), WebhookError> {
        let file = Part::bytes(data.to_vec()).file_name(file_name.to_owned());
        let form = Form::new()
            .text("content", content.to_owned())
            .part("file", file);

        let resp = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await?;

        Self::check_status(resp).await
    }

    async fn check_status(resp: Response) -> Result<(), WebhookError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        tracing::debug!("Webhook rejected payload with {}: {}", status, body);
        Err(WebhookError::Api {
            status: status.as_u16(),
            body,
        })
    }
}
