use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, warn};

use crate::webhook::WebhookNotifier;
use crate::{Channel, NotificationConfig, Notifier};

/// Marker appended to a message whose attachment could not be delivered
pub const IMAGE_UPLOAD_FAILED: &str = " (Image upload failed)";

/// Outcome of a single delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Delivered as requested
    Sent,
    /// Attachment rejected, text-only fallback delivered
    FellBack,
    /// No destination configured for the channel
    Skipped,
    /// Nothing could be delivered
    Failed,
}

/// Routes messages to the notifier configured for each channel.
///
/// Delivery is best-effort: every failure is logged and reported through
/// [`Delivery`], never returned as an error.
pub struct Dispatcher {
    notifiers: HashMap<Channel, Arc<dyn Notifier>>,
    warned: Mutex<HashSet<Channel>>,
}

impl Dispatcher {
    /// Builds a webhook notifier for every configured channel.
    pub fn new(config: &NotificationConfig, http_client: reqwest::Client) -> Self {
        let notifiers = config
            .configured_channels()
            .into_iter()
            .filter_map(|channel| {
                let url = config.destination(channel)?;
                let notifier: Arc<dyn Notifier> =
                    Arc::new(WebhookNotifier::new(http_client.clone(), url));
                Some((channel, notifier))
            })
            .collect();

        Self::with_notifiers(notifiers)
    }

    /// Uses the given notifiers as-is.
    pub fn with_notifiers(notifiers: HashMap<Channel, Arc<dyn Notifier>>) -> Self {
        Self {
            notifiers,
            warned: Mutex::new(HashSet::new()),
        }
    }

    pub fn is_configured(&self, channel: Channel) -> bool {
        self.notifiers.contains_key(&channel)
    }

    /// Sends a text message.
    pub async fn send(&self, channel: Channel, message: &str) -> Delivery {
        let Some(notifier) = self.notifier(channel) else {
            return Delivery::Skipped;
        };

        match notifier.send_message(message).await {
            Ok(()) => Delivery::Sent,
            Err(e) => {
                error!("Failed to send message to {} channel: {}", channel, e);
                Delivery::Failed
            }
        }
    }

    /// Sends a message with an attachment, falling back to text when the
    /// attachment cannot be delivered.
    pub async fn send_with_attachment(
        &self,
        channel: Channel,
        message: &str,
        attachment: &[u8],
        file_name: &str,
    ) -> Delivery {
        let Some(notifier) = self.notifier(channel) else {
            return Delivery::Skipped;
        };

        let Err(e) = notifier
            .send_message_with_attachment(message, attachment, file_name)
            .await
        else {
            return Delivery::Sent;
        };

        error!(
            "Failed to send image {} to {} channel: {}",
            file_name, channel, e
        );

        let fallback = format!("{}{}", message, IMAGE_UPLOAD_FAILED);
        match notifier.send_message(&fallback).await {
            Ok(()) => Delivery::FellBack,
            Err(e) => {
                error!("Failed to send fallback text to {} channel: {}", channel, e);
                Delivery::Failed
            }
        }
    }

    fn notifier(&self, channel: Channel) -> Option<&Arc<dyn Notifier>> {
        let notifier = self.notifiers.get(&channel);
        if notifier.is_none() && self.warned.lock().insert(channel) {
            warn!(
                "No valid webhook URL found for {}, skipping notifications",
                channel
            );
        }
        notifier
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    /// Records deliveries; optionally rejects attachments or everything.
    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        pub texts: Mutex<Vec<String>>,
        pub files: Mutex<Vec<(String, String, usize)>>,
        pub reject_attachments: bool,
        pub reject_all: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_message(&self, text: &str) -> Result<()> {
            if self.reject_all {
                return Err(anyhow!("offline"));
            }
            self.texts.lock().push(text.to_string());
            Ok(())
        }

        async fn send_message_with_attachment(
            &self,
            text: &str,
            attachment: &[u8],
            file_name: &str,
        ) -> Result<()> {
            if self.reject_all || self.reject_attachments {
                return Err(anyhow!("payload too large"));
            }
            self.files
                .lock()
                .push((text.to_string(), file_name.to_string(), attachment.len()));
            Ok(())
        }
    }

    fn dispatcher_with(channel: Channel, notifier: Arc<RecordingNotifier>) -> Dispatcher {
        let mut notifiers: HashMap<Channel, Arc<dyn Notifier>> = HashMap::new();
        notifiers.insert(channel, notifier);
        Dispatcher::with_notifiers(notifiers)
    }

    #[tokio::test]
    async fn test_attachment_is_delivered() {
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = dispatcher_with(Channel::Art, Arc::clone(&notifier));

        let result = dispatcher
            .send_with_attachment(Channel::Art, "found", &[1, 2, 3], "abc00.jpg")
            .await;

        assert_eq!(result, Delivery::Sent);
        assert_eq!(
            *notifier.files.lock(),
            vec![("found".to_string(), "abc00.jpg".to_string(), 3)]
        );
        assert!(notifier.texts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_attachment_falls_back_to_text() {
        let notifier = Arc::new(RecordingNotifier {
            reject_attachments: true,
            ..Default::default()
        });
        let dispatcher = dispatcher_with(Channel::Label, Arc::clone(&notifier));

        let result = dispatcher
            .send_with_attachment(Channel::Label, "new label", &[0; 8], "abc01.png")
            .await;

        assert_eq!(result, Delivery::FellBack);
        assert_eq!(
            *notifier.texts.lock(),
            vec!["new label (Image upload failed)".to_string()]
        );
    }

    #[tokio::test]
    async fn test_total_failure_is_reported_not_raised() {
        let notifier = Arc::new(RecordingNotifier {
            reject_all: true,
            ..Default::default()
        });
        let dispatcher = dispatcher_with(Channel::Frame, notifier);

        assert_eq!(
            dispatcher
                .send_with_attachment(Channel::Frame, "frame", &[0], "HeadFrame600.png")
                .await,
            Delivery::Failed
        );
        assert_eq!(dispatcher.send(Channel::Frame, "frame").await, Delivery::Failed);
    }

    #[tokio::test]
    async fn test_unconfigured_channel_is_skipped() {
        let dispatcher = Dispatcher::with_notifiers(HashMap::new());

        assert!(!dispatcher.is_configured(Channel::Joystick));
        assert_eq!(
            dispatcher.send(Channel::Joystick, "hello").await,
            Delivery::Skipped
        );
        assert_eq!(
            dispatcher
                .send_with_attachment(Channel::Joystick, "hello", &[1], "x.jpg")
                .await,
            Delivery::Skipped
        );
        assert!(dispatcher.warned.lock().contains(&Channel::Joystick));
    }
}
