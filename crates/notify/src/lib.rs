//! Outbound notifications for discovered assets.
//!
//! - [`NotificationQueue`]: single-worker, rate-limited, timeout-bounded job runner
//! - [`Dispatcher`]: routes a message to the notifier configured for a [`Channel`]
//! - [`NotificationHandle`]: fire-and-forget front door combining the two

mod config;
mod dispatcher;
mod handle;
mod queue;
pub mod webhook;

use anyhow::Result;
use async_trait::async_trait;

pub use config::NotificationConfig;
pub use dispatcher::{Delivery, Dispatcher, IMAGE_UPLOAD_FAILED};
pub use handle::NotificationHandle;
pub use queue::{NotificationQueue, QueueConfig, QueueStats};

/// Outbound channel, one per asset class
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Channel {
    Art,
    Label,
    Joystick,
    Frame,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Art,
        Channel::Label,
        Channel::Joystick,
        Channel::Frame,
    ];
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Art => write!(f, "art"),
            Channel::Label => write!(f, "label"),
            Channel::Joystick => write!(f, "joystick"),
            Channel::Frame => write!(f, "frame"),
        }
    }
}

/// Delivery backend for a single destination
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a text message
    async fn send_message(&self, text: &str) -> Result<()>;

    /// Send a message with a binary attachment
    async fn send_message_with_attachment(
        &self,
        text: &str,
        attachment: &[u8],
        file_name: &str,
    ) -> Result<()>;
}

/// Create the notification service: a dispatcher built from `config` behind a
/// freshly spawned queue worker.
///
/// Must be called from within a tokio runtime.
pub fn create_notification_service(
    config: &NotificationConfig,
    http_client: reqwest::Client,
    queue_config: QueueConfig,
) -> NotificationHandle {
    let dispatcher = Dispatcher::new(config, http_client);
    NotificationHandle::new(dispatcher, NotificationQueue::new(queue_config))
}
