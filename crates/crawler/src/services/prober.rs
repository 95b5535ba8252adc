use std::time::Duration;

use reqwest::Client;

use crate::config::DEFAULT_PROBE_TIMEOUT;
use crate::models::{FoundAsset, ProbeResult, ServerEndpoint};

/// Tries an identifier against an ordered list of mirrors.
///
/// One request per server, strictly in list order, no retries. Transport
/// errors and non-2xx responses count as a miss on that server only.
#[derive(Clone)]
pub struct AssetProber {
    client: Client,
    timeout: Duration,
}

impl AssetProber {
    pub fn new(client: Client) -> Self {
        Self::with_timeout(client, DEFAULT_PROBE_TIMEOUT)
    }

    pub fn with_timeout(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Returns the first successful payload, or [`ProbeResult::NotFound`]
    /// once every server has been tried.
    pub async fn probe(
        &self,
        id: &str,
        servers: &[ServerEndpoint],
        placeholder: &str,
    ) -> ProbeResult {
        for server in servers {
            let url = server.resolve(placeholder, id);

            if let Some(bytes) = self.fetch(id, &server.name, &url).await {
                return ProbeResult::Found(FoundAsset {
                    server: server.name.clone(),
                    source_url: url,
                    bytes,
                });
            }
        }

        ProbeResult::NotFound
    }

    async fn fetch(&self, id: &str, server: &str, url: &str) -> Option<Vec<u8>> {
        let response = match self.client.get(url).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Error fetching {} from {}: {}", id, server, e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(
                "Not found {} at server {} ({})",
                id,
                server,
                response.status()
            );
            return None;
        }

        match response.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                tracing::warn!("Error reading {} from {}: {}", id, server, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn servers(base: &str) -> Vec<ServerEndpoint> {
        ["s1", "s2", "s3"]
            .iter()
            .map(|name| ServerEndpoint::new(*name, format!("{}/{}/##ID##.jpg", base, name)))
            .collect()
    }

    #[tokio::test]
    async fn test_success_is_attributed_to_answering_server() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s1/abc00.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock)
            .await;
        Mock::given(method("GET"))
            .and(path("/s2/abc00.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"image".to_vec()))
            .expect(1)
            .mount(&mock)
            .await;
        Mock::given(method("GET"))
            .and(path("/s3/abc00.jpg"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock)
            .await;

        let prober = AssetProber::new(Client::new());
        let result = prober.probe("abc00", &servers(&mock.uri()), "##ID##").await;

        match result {
            ProbeResult::Found(asset) => {
                assert_eq!(asset.server, "s2");
                assert_eq!(asset.source_url, format!("{}/s2/abc00.jpg", mock.uri()));
                assert_eq!(asset.bytes, b"image");
            }
            ProbeResult::NotFound => panic!("expected a hit on s2"),
        }
    }

    #[tokio::test]
    async fn test_exhausted_list_is_not_found() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .expect(3)
            .mount(&mock)
            .await;

        let prober = AssetProber::new(Client::new());
        let result = prober.probe("abc09", &servers(&mock.uri()), "##ID##").await;

        assert!(!result.is_found());
    }

    #[tokio::test]
    async fn test_slow_server_is_skipped_after_timeout() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s1/abc00.jpg"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&mock)
            .await;
        Mock::given(method("GET"))
            .and(path("/s2/abc00.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fast".to_vec()))
            .mount(&mock)
            .await;

        let prober = AssetProber::with_timeout(Client::new(), Duration::from_millis(200));
        let result = prober.probe("abc00", &servers(&mock.uri()), "##ID##").await;

        match result {
            ProbeResult::Found(asset) => assert_eq!(asset.server, "s2"),
            ProbeResult::NotFound => panic!("expected fallback to s2"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_falls_through() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s2/abc00.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .mount(&mock)
            .await;

        // Port 9 (discard) on localhost is closed in test environments.
        let list = vec![
            ServerEndpoint::new("dead", "http://127.0.0.1:9/##ID##.jpg"),
            ServerEndpoint::new("s2", format!("{}/s2/##ID##.jpg", mock.uri())),
        ];

        let prober = AssetProber::with_timeout(Client::new(), Duration::from_secs(2));
        let result = prober.probe("abc00", &list, "##ID##").await;

        assert!(result.is_found());
    }
}
