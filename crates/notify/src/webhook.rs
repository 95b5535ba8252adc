use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use webhook::WebhookClient;

use super::Notifier;

/// Webhook-backed notifier for one channel destination
pub struct WebhookNotifier {
    client: WebhookClient,
}

impl WebhookNotifier {
    pub fn new(client: Client, url: &str) -> Self {
        Self {
            client: WebhookClient::new(client, url),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send_message(&self, text: &str) -> Result<()> {
        self.client
            .send_message(text)
            .await
            .map_err(|e| anyhow::anyhow!("Webhook send failed: {}", e))
    }

    async fn send_message_with_attachment(
        &self,
        text: &str,
        attachment: &[u8],
        file_name: &str,
    ) -> Result<()> {
        self.client
            .send_file(text, attachment, file_name)
            .await
            .map_err(|e| anyhow::anyhow!("Webhook upload failed: {}", e))
    }
}
