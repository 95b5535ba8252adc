//! Shared fixtures for in-crate tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use notify::{
    Channel, Dispatcher, NotificationHandle, NotificationQueue, Notifier, QueueConfig,
};
use parking_lot::Mutex;

use crate::catalog::Catalog;

/// Notifier that keeps every message it is asked to deliver.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub texts: Mutex<Vec<String>>,
    pub files: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_message(&self, text: &str) -> Result<()> {
        self.texts.lock().push(text.to_string());
        Ok(())
    }

    async fn send_message_with_attachment(
        &self,
        text: &str,
        _attachment: &[u8],
        file_name: &str,
    ) -> Result<()> {
        self.files
            .lock()
            .push((text.to_string(), file_name.to_string()));
        Ok(())
    }
}

/// Notification handle routing every channel to one recorder, with a short
/// queue interval so tests drain quickly.
pub(crate) fn recording_handle() -> (NotificationHandle, Arc<RecordingNotifier>) {
    let recorder = Arc::new(RecordingNotifier::default());
    let notifiers: HashMap<Channel, Arc<dyn Notifier>> = Channel::ALL
        .into_iter()
        .map(|channel| (channel, Arc::clone(&recorder) as Arc<dyn Notifier>))
        .collect();

    let queue = NotificationQueue::new(QueueConfig {
        interval: Duration::from_millis(5),
        timeout: Duration::from_secs(5),
    });

    (
        NotificationHandle::new(Dispatcher::with_notifiers(notifiers), queue),
        recorder,
    )
}

/// Catalog whose every class points at `base` (a mock server), with one
/// mirror named `sea`.
pub(crate) fn catalog_for(base: &str, roster: &[&str]) -> Catalog {
    let roster = roster
        .iter()
        .map(|s| format!("\"{}\"", s))
        .collect::<Vec<_>>()
        .join(", ");

    let content = format!(
        r###"
roster = [{roster}]

[names]
abc = "Alpha"

[[servers.art]]
name = "sea"
url = "{base}/art/##ID##.jpg"

[[servers.label]]
name = "sea"
url = "{base}/label/##ID##.png"

[[servers.joystick]]
name = "sea"
url = "{base}/joy/$ID$.jpg"

[[servers.frame]]
name = "sea"
url = "{base}/frame/##ID##.png"
"###
    );

    match Catalog::from_toml_str(&content) {
        Ok(catalog) => catalog,
        Err(e) => panic!("invalid test catalog: {}", e),
    }
}
