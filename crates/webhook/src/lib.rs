//! Chat webhook client library.
//!
//! Posts messages to an incoming-webhook URL. Text messages are sent as a
//! JSON body `{"content": ...}`, file messages as a multipart form with a
//! `content` field and a binary `file` field.
//!
//! # Example
//!
//! ```rust,ignore
//! use webhook::WebhookClient;
//!
//! let client = WebhookClient::new(reqwest::Client::new(), "https://discord.com/api/webhooks/...");
//! client.send_message("Hello, World!").await?;
//! ```

mod client;
mod error;

pub use client::WebhookClient;
pub use error::WebhookError;
