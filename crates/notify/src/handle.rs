use std::sync::Arc;

use crate::{Channel, Dispatcher, NotificationQueue};

/// Notification service handle (public entry point).
///
/// Every `notify*` call enqueues a job on the shared [`NotificationQueue`]
/// and returns immediately.
#[derive(Clone)]
pub struct NotificationHandle {
    dispatcher: Arc<Dispatcher>,
    queue: NotificationQueue,
}

impl NotificationHandle {
    pub fn new(dispatcher: Dispatcher, queue: NotificationQueue) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            queue,
        }
    }

    /// Send a text message (fire-and-forget)
    pub fn notify(&self, channel: Channel, message: impl Into<String>) {
        self.notify_with_priority(channel, message, 0);
    }

    pub fn notify_with_priority(
        &self,
        channel: Channel,
        message: impl Into<String>,
        priority: i32,
    ) {
        let dispatcher = Arc::clone(&self.dispatcher);
        let message = message.into();
        self.queue.enqueue_with_priority(
            async move {
                dispatcher.send(channel, &message).await;
            },
            priority,
        );
    }

    /// Send a message with an attachment (fire-and-forget).
    ///
    /// Falls back to a text-only message if the attachment is rejected.
    pub fn notify_with_attachment(
        &self,
        channel: Channel,
        message: impl Into<String>,
        attachment: Vec<u8>,
        file_name: impl Into<String>,
    ) {
        self.notify_with_attachment_priority(channel, message, attachment, file_name, 0);
    }

    pub fn notify_with_attachment_priority(
        &self,
        channel: Channel,
        message: impl Into<String>,
        attachment: Vec<u8>,
        file_name: impl Into<String>,
        priority: i32,
    ) {
        let dispatcher = Arc::clone(&self.dispatcher);
        let message = message.into();
        let file_name = file_name.into();
        self.queue.enqueue_with_priority(
            async move {
                dispatcher
                    .send_with_attachment(channel, &message, &attachment, &file_name)
                    .await;
            },
            priority,
        );
    }

    /// Direct access to the dispatcher, bypassing the queue
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn queue(&self) -> &NotificationQueue {
        &self.queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::tests::RecordingNotifier;
    use crate::{Notifier, QueueConfig};
    use std::collections::HashMap;
    use std::time::Duration;

    #[tokio::test]
    async fn test_notify_returns_before_delivery() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut notifiers: HashMap<Channel, Arc<dyn Notifier>> = HashMap::new();
        notifiers.insert(Channel::Art, Arc::clone(&notifier) as Arc<dyn Notifier>);

        let queue = NotificationQueue::new(QueueConfig {
            interval: Duration::from_millis(5),
            timeout: Duration::from_secs(5),
        });
        let handle = NotificationHandle::new(Dispatcher::with_notifiers(notifiers), queue);

        handle.queue().pause();
        handle.notify(Channel::Art, "plain");
        handle.notify_with_attachment(Channel::Art, "with file", vec![1, 2], "abc00.jpg");
        assert_eq!(handle.queue().size(), 2);
        assert!(notifier.texts.lock().is_empty());

        handle.queue().resume();
        handle.queue().on_idle().await;

        assert_eq!(*notifier.texts.lock(), vec!["plain".to_string()]);
        assert_eq!(notifier.files.lock().len(), 1);
    }
}
