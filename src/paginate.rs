use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::fetch::Fetcher;
use crate::record::Record;

/// Safety ceiling when no explicit page limit is requested. Guards
/// against a site that paginates forever.
pub const MAX_PAGES_HARD_LIMIT: u32 = 100;

/// A site variant is one configuration value for the shared engine:
/// a URL template, a page parser, and a "has more pages" probe.
pub trait Site {
    type Record: Record;

    /// Full URL for the 1-based page number.
    fn page_url(&self, page: u32) -> String;

    /// Extract records from one fetched page. Unexpected document shape
    /// degrades to null fields or an empty batch; it never errors.
    fn parse_page(&self, body: &str) -> Vec<Self::Record>;

    /// Whether the page just parsed advertises a successor. Sites that
    /// terminate via empty page or 404 leave the default.
    fn has_next(&self, _page: u32, _body: &str) -> bool {
        true
    }
}

/// Why the page loop ended. All variants are non-error outcomes: the
/// records accumulated so far are returned as-is. A fetch failure after
/// retries is deliberately conflated with end-of-data — a 404 on page N
/// is the expected signal that N-1 was the last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Page parsed to zero records.
    EmptyPage,
    /// The site's has-next probe said no.
    NoNextPage,
    /// Fetch failed after retries (404, transport, 5xx).
    FetchError,
    /// Requested page limit or the hard ceiling reached.
    PageLimit,
    /// Cancel flag raised before the next fetch.
    Cancelled,
}

/// Accumulated result of a pagination run, in page-then-in-page order.
#[derive(Debug)]
pub struct Scrape<R> {
    pub records: Vec<R>,
    pub pages: u32,
    pub stop: StopReason,
}

/// Cooperative cancellation: once raised, the loop stops issuing new
/// fetches and returns what it has collected.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Walk a site's pages from page 1 until a stop condition fires,
/// appending each page's batch in order.
///
/// Stop conditions are evaluated in a fixed order after each page:
/// fetch failure, empty batch, has-next probe, page limit. An explicit
/// `limit` caps the run; the hard ceiling applies regardless.
pub async fn collect<S: Site>(
    fetcher: &Fetcher,
    site: &S,
    limit: Option<u32>,
    cancel: &CancelFlag,
) -> Scrape<S::Record> {
    let max_pages = limit
        .unwrap_or(MAX_PAGES_HARD_LIMIT)
        .min(MAX_PAGES_HARD_LIMIT)
        .max(1);

    let mut records = Vec::new();
    let mut pages_done = 0u32;
    let mut page = 1u32;

    let stop = loop {
        if cancel.is_cancelled() {
            break StopReason::Cancelled;
        }

        let url = site.page_url(page);
        let body = match fetcher.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                // End of pagination, not a fatal error: a 404 here is
                // the normal last-page signal. A transient failure
                // truncates the run the same way.
                warn!("Page {} ended pagination: {}", page, e);
                break StopReason::FetchError;
            }
        };

        let batch = site.parse_page(&body);
        if batch.is_empty() {
            break StopReason::EmptyPage;
        }

        info!("Page {}: {} records", page, batch.len());
        records.extend(batch);
        pages_done = page;

        if !site.has_next(page, &body) {
            break StopReason::NoNextPage;
        }
        if page >= max_pages {
            break StopReason::PageLimit;
        }

        page += 1;
        tokio::time::sleep(fetcher.delay()).await;
    };

    info!("Collected {} records from {} pages ({:?})", records.len(), pages_done, stop);
    Scrape {
        records,
        pages: pages_done,
        stop,
    }
}
