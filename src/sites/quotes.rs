use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::export::{export, ExportBlob, Format};
use crate::fetch::Fetcher;
use crate::paginate::{self, CancelFlag, Scrape, Site};
use crate::record::Quote;

const BASE_URL: &str = "https://quotes.toscrape.com";

static QUOTE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.quote").unwrap());
static TEXT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span.text").unwrap());
static AUTHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("small.author").unwrap());
static AUTHOR_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href^="/author/"]"#).unwrap());
static TAG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.tags a.tag").unwrap());
static NEXT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li.next a").unwrap());

/// Quote listing site: optional tag filter, terminated by the absence
/// of the "next" link.
pub struct QuotesSite {
    base: String,
    tag: Option<String>,
}

impl QuotesSite {
    pub fn new(tag: Option<&str>) -> Self {
        Self::with_base(BASE_URL, tag)
    }

    pub fn with_base(base: &str, tag: Option<&str>) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            tag: tag
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty()),
        }
    }
}

impl Site for QuotesSite {
    type Record = Quote;

    fn page_url(&self, page: u32) -> String {
        match &self.tag {
            Some(tag) => format!("{}/tag/{}/page/{}/", self.base, tag, page),
            None => format!("{}/page/{}/", self.base, page),
        }
    }

    fn parse_page(&self, body: &str) -> Vec<Quote> {
        let doc = Html::parse_document(body);
        doc.select(&QUOTE).map(parse_quote).collect()
    }

    fn has_next(&self, _page: u32, body: &str) -> bool {
        Html::parse_document(body).select(&NEXT).next().is_some()
    }
}

fn parse_quote(div: ElementRef) -> Quote {
    let text = div.select(&TEXT).next().map(|el| {
        el.text()
            .collect::<String>()
            .trim()
            .trim_matches(&['\u{201c}', '\u{201d}', '"', '\''][..])
            .to_string()
    });

    let author = div
        .select(&AUTHOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string());

    let author_url = div
        .select(&AUTHOR_LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);

    let tags = div
        .select(&TAG)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .collect();

    Quote {
        text,
        author,
        author_url,
        tags,
    }
}

/// Scrape quote pages, optionally filtered by tag.
pub async fn scrape(
    config: &ScrapeConfig,
    tag: Option<&str>,
    pages: Option<u32>,
) -> Result<Scrape<Quote>, ScrapeError> {
    scrape_at(config, BASE_URL, tag, pages).await
}

pub async fn scrape_at(
    config: &ScrapeConfig,
    base: &str,
    tag: Option<&str>,
    pages: Option<u32>,
) -> Result<Scrape<Quote>, ScrapeError> {
    let fetcher = Fetcher::new(config)?;
    let site = QuotesSite::with_base(base, tag);
    Ok(paginate::collect(&fetcher, &site, pages, &CancelFlag::new()).await)
}

/// Fetch + export in one call.
pub async fn get(
    config: &ScrapeConfig,
    tag: Option<&str>,
    pages: Option<u32>,
    format: Format,
) -> Result<ExportBlob, ScrapeError> {
    let scrape = scrape(config, tag, pages).await?;
    Ok(export(&scrape.records, format)?)
}
