use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::config::ScraperConfig;
use crate::error::{KickerError, Result};

/// Anything that can deliver the HTML of a page.
///
/// [`Transport`] is the network implementation; discovery, match extraction
/// and the batch orchestrator only depend on this trait.
pub trait PageSource {
    fn fetch_page(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Rate-limited HTTP client.
///
/// Consecutive requests through one `Transport` are at least `delay` apart,
/// whichever caller issues them. Failures are returned as they are; retrying
/// is left to the caller.
#[derive(Debug)]
pub struct Transport {
    http: reqwest::Client,
    delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Transport {
    /// Build a client with a browser-like identity and the configured timeouts.
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("de-DE,de;q=0.9,en;q=0.8"),
        );

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| KickerError::InvalidConfig(e.to_string()))?;

        Ok(Self::with_client(http, config.request_delay()))
    }

    /// Wrap an already configured [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, delay: Duration) -> Self {
        Self {
            http: client,
            delay,
            last_request: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Fetch a URL and return the response body.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        self.throttle().await;
        debug!(url, "fetching page");

        let response = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                KickerError::Timeout {
                    url: url.to_owned(),
                }
            } else {
                KickerError::Http {
                    url: url.to_owned(),
                    source: e,
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(KickerError::UnexpectedStatus {
                url: url.to_owned(),
                status,
            });
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                KickerError::Timeout {
                    url: url.to_owned(),
                }
            } else {
                KickerError::ResponseBody {
                    url: url.to_owned(),
                    source: e,
                }
            }
        })
    }

    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.delay {
                sleep(self.delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl PageSource for Transport {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.fetch(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_delay() {
        let config = ScraperConfig {
            request_delay_secs: -1.0,
            ..ScraperConfig::default()
        };
        assert!(matches!(
            Transport::new(&config),
            Err(KickerError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_throttle_spaces_requests() {
        let transport = Transport::with_client(reqwest::Client::new(), Duration::from_millis(30));
        let start = Instant::now();
        transport.throttle().await;
        transport.throttle().await;
        transport.throttle().await;
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        let config = ScraperConfig::default()
            .with_request_delay(Duration::from_millis(1))
            .with_timeouts(Duration::from_secs(2), Duration::from_secs(2));
        let transport = Transport::new(&config).unwrap();
        let err = transport.fetch("http://127.0.0.1:9/").await.unwrap_err();
        assert!(err.is_network());
    }
}
