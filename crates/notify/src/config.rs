use std::collections::HashMap;

use crate::Channel;

/// Placeholder value some deployments use for "no webhook"
const DISABLED_MARKER: &str = "test";

/// Per-channel destination URLs
#[derive(Debug, Clone, Default)]
pub struct NotificationConfig {
    destinations: HashMap<Channel, String>,
}

impl NotificationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the destination for a channel. Empty values and the `test`
    /// marker leave the channel unconfigured.
    pub fn with_destination(mut self, channel: Channel, url: impl Into<String>) -> Self {
        let url = url.into();
        let url = url.trim();
        if url.is_empty() || url == DISABLED_MARKER {
            self.destinations.remove(&channel);
        } else {
            self.destinations.insert(channel, url.to_string());
        }
        self
    }

    /// Configured destination for a channel
    pub fn destination(&self, channel: Channel) -> Option<&str> {
        self.destinations.get(&channel).map(String::as_str)
    }

    /// Channels with a destination
    pub fn configured_channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| self.destinations.contains_key(c))
            .collect()
    }
}
