use rand::seq::IndexedRandom;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, warn};

use crate::config::ScrapeConfig;
use crate::error::{FetchError, ScrapeError};

/// Identity sent when rotation is disabled, and the pool drawn from when
/// it is enabled. Rotation only varies the surface string; it is not a
/// correctness mechanism.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

const USER_AGENT_POOL: &[&str] = &[
    DEFAULT_USER_AGENT,
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:127.0) Gecko/20100101 Firefox/127.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
];

/// HTTP fetcher with a shared connection pool and retry/backoff.
///
/// One instance per scrape run; safe to share across tasks.
pub struct Fetcher {
    client: reqwest::Client,
    config: ScrapeConfig,
}

impl Fetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self, ScrapeError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers());

        if let Some(url) = &config.proxy {
            let proxy = reqwest::Proxy::all(url).map_err(ScrapeError::Client)?;
            builder = builder.proxy(proxy);
        }

        let mut config = config.clone();
        config.max_retries = config.max_retries.max(1);

        Ok(Self {
            client: builder.build().map_err(ScrapeError::Client)?,
            config,
        })
    }

    /// Fixed delay between consecutive page fetches.
    pub fn delay(&self) -> std::time::Duration {
        self.config.delay
    }

    /// Fetch a URL, retrying transport failures and non-2xx statuses
    /// with exponential backoff. Exhausted retries surface as
    /// `FetchFailed` carrying the last underlying cause.
    pub async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let mut last_error = None;

        for attempt in 1..=self.config.max_retries {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    if attempt < self.config.max_retries {
                        let backoff = self.config.backoff(attempt);
                        warn!(
                            "Fetch failed for {} (attempt {}/{}), backing off {:.1}s: {}",
                            url,
                            attempt,
                            self.config.max_retries,
                            backoff.as_secs_f64(),
                            e
                        );
                        tokio::time::sleep(backoff).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(ScrapeError::FetchFailed {
            attempts: self.config.max_retries,
            // max_retries >= 1, so at least one attempt ran
            source: last_error.expect("at least one fetch attempt"),
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        debug!("Fetching: {}", url);

        let mut request = self.client.get(url);
        if self.config.rotate_user_agent {
            request = request.header(USER_AGENT, random_user_agent());
        } else {
            request = request.header(USER_AGENT, DEFAULT_USER_AGENT);
        }

        let response = request.send().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            source: e,
        })
    }
}

fn random_user_agent() -> &'static str {
    USER_AGENT_POOL
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(DEFAULT_USER_AGENT)
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "Accept",
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert("Accept-Language", HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));
    headers
}
