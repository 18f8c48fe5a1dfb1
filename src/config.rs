use std::time::Duration;

/// Scrape-wide settings, passed explicitly into the fetcher instead of
/// living in process-global state.
///
/// `from_env` honors the same variables the deployment scripts already
/// set: REQUEST_TIMEOUT, REQUEST_DELAY, MAX_RETRIES,
/// MAX_CONCURRENT_REQUESTS, PROXY_URL.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Fixed delay between consecutive page fetches.
    pub delay: Duration,
    /// Maximum fetch attempts per page (first try included).
    pub max_retries: u32,
    /// Backoff floor for the first retry.
    pub backoff_floor: Duration,
    /// Backoff ceiling; doubling stops here.
    pub backoff_ceiling: Duration,
    /// Outbound proxy URL, applied to both http and https.
    pub proxy: Option<String>,
    /// Rotate the User-Agent per attempt. Off = fixed identity.
    pub rotate_user_agent: bool,
    /// Upper bound for a concurrent fetch pool. The sequential engine
    /// ignores it; carried so callers can size a pool without a second
    /// config type.
    pub max_concurrency: usize,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            delay: Duration::from_secs(1),
            max_retries: 3,
            backoff_floor: Duration::from_secs(2),
            backoff_ceiling: Duration::from_secs(10),
            proxy: None,
            rotate_user_agent: true,
            max_concurrency: 5,
        }
    }
}

impl ScrapeConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(secs) = env_parse::<u64>("REQUEST_TIMEOUT") {
            cfg.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<f64>("REQUEST_DELAY") {
            cfg.delay = Duration::from_secs_f64(secs.max(0.0));
        }
        if let Some(n) = env_parse::<u32>("MAX_RETRIES") {
            cfg.max_retries = n.max(1);
        }
        if let Some(n) = env_parse::<usize>("MAX_CONCURRENT_REQUESTS") {
            cfg.max_concurrency = n.max(1);
        }
        if let Ok(url) = std::env::var("PROXY_URL") {
            if !url.trim().is_empty() {
                cfg.proxy = Some(url);
            }
        }
        cfg
    }

    /// Backoff before the given retry (1-based): floor doubled per
    /// attempt, clamped to the ceiling.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        let raw = self.backoff_floor.saturating_mul(factor);
        raw.clamp(self.backoff_floor, self.backoff_ceiling)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.trim().parse().ok()
}
