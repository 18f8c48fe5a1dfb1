use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::export::{export, ExportBlob, Format};
use crate::fetch::Fetcher;
use crate::paginate::{self, CancelFlag, Scrape, Site};
use crate::record::Book;
use crate::sites::categories;

const BASE_URL: &str = "https://books.toscrape.com";

static PRODUCT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article.product_pod").unwrap());
static TITLE_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3 a").unwrap());
static PRICE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".price_color").unwrap());
static RATING: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".star-rating").unwrap());
static AVAILABILITY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".availability").unwrap());

static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\d.]+").unwrap());

const RATING_WORDS: &[(&str, u8)] =
    &[("One", 1), ("Two", 2), ("Three", 3), ("Four", 4), ("Five", 5)];

/// Book listing site: category-sluggged numeric pages, terminated by a
/// 404 or an empty page (no next-link probe).
pub struct BooksSite {
    base: String,
    slug: String,
}

impl BooksSite {
    pub fn new(slug: &str) -> Self {
        Self::with_base(BASE_URL, slug)
    }

    /// Base override for tests against a local server.
    pub fn with_base(base: &str, slug: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            slug: slug.to_string(),
        }
    }
}

impl Site for BooksSite {
    type Record = Book;

    fn page_url(&self, page: u32) -> String {
        format!(
            "{}/catalogue/category/{}/page-{}.html",
            self.base, self.slug, page
        )
    }

    fn parse_page(&self, body: &str) -> Vec<Book> {
        let doc = Html::parse_document(body);
        doc.select(&PRODUCT).map(parse_book).collect()
    }
}

fn parse_book(article: ElementRef) -> Book {
    let title_link = article.select(&TITLE_LINK).next();
    let title = title_link
        .and_then(|a| a.value().attr("title"))
        .map(str::to_string);
    let url = title_link
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);

    let price = article
        .select(&PRICE)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string());
    let price_float = price.as_deref().and_then(parse_price);

    let rating = article.select(&RATING).next().and_then(parse_rating);

    let in_stock = article
        .select(&AVAILABILITY)
        .next()
        .map(|el| {
            el.text()
                .collect::<String>()
                .to_lowercase()
                .contains("in stock")
        })
        .unwrap_or(false);

    Book {
        title,
        price,
        price_float,
        rating,
        in_stock,
        url,
    }
}

/// First contiguous digits-and-dot run, so "£51.77" and "51,77 zł"
/// style inputs both coerce without raising. No run → None.
fn parse_price(display: &str) -> Option<f64> {
    PRICE_RE.find(display)?.as_str().parse().ok()
}

/// The site encodes the rating as a class token ("star-rating Three").
/// Unrecognized tokens yield None rather than an error.
fn parse_rating(el: ElementRef) -> Option<u8> {
    el.value().classes().find_map(|class| {
        RATING_WORDS
            .iter()
            .find(|(word, _)| *word == class)
            .map(|(_, n)| *n)
    })
}

/// Scrape a category's listing pages into canonical book records.
/// Category resolution happens before any network call.
pub async fn scrape(
    config: &ScrapeConfig,
    category: Option<&str>,
    pages: Option<u32>,
) -> Result<Scrape<Book>, ScrapeError> {
    scrape_at(config, BASE_URL, category, pages).await
}

pub async fn scrape_at(
    config: &ScrapeConfig,
    base: &str,
    category: Option<&str>,
    pages: Option<u32>,
) -> Result<Scrape<Book>, ScrapeError> {
    let slug = categories::resolve(category)?;
    let fetcher = Fetcher::new(config)?;
    let site = BooksSite::with_base(base, slug);
    Ok(paginate::collect(&fetcher, &site, pages, &CancelFlag::new()).await)
}

/// Fetch + export in one call: the surface the CLI (or an HTTP layer)
/// consumes.
pub async fn get(
    config: &ScrapeConfig,
    category: Option<&str>,
    pages: Option<u32>,
    format: Format,
) -> Result<ExportBlob, ScrapeError> {
    let scrape = scrape(config, category, pages).await?;
    Ok(export(&scrape.records, format)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <article class="product_pod">
            <p class="star-rating Three"></p>
            <h3><a href="a-light-in-the-attic_1000/index.html"
                   title="A Light in the Attic">A Light in the ...</a></h3>
            <p class="price_color">£51.77</p>
            <p class="instock availability">In stock</p>
        </article>
        <article class="product_pod">
            <p class="star-rating Zero"></p>
            <h3><a href="soumission_998/index.html" title="Soumission">Soumission</a></h3>
            <p class="price_color">N/A</p>
            <p class="availability">Out of stock</p>
        </article>
        </body></html>"#;

    #[test]
    fn parses_full_and_degraded_records() {
        let site = BooksSite::new("books_1");
        let books = site.parse_page(PAGE);
        assert_eq!(books.len(), 2);

        let first = &books[0];
        assert_eq!(first.title.as_deref(), Some("A Light in the Attic"));
        assert_eq!(first.price.as_deref(), Some("£51.77"));
        assert_eq!(first.price_float, Some(51.77));
        assert_eq!(first.rating, Some(3));
        assert!(first.in_stock);
        assert_eq!(first.url.as_deref(), Some("a-light-in-the-attic_1000/index.html"));

        // Unknown rating word and unparseable price degrade to None
        let second = &books[1];
        assert_eq!(second.rating, None);
        assert_eq!(second.price_float, None);
        assert!(!second.in_stock);
    }

    #[test]
    fn missing_subelements_yield_nulls_not_errors() {
        let site = BooksSite::new("books_1");
        let books = site.parse_page(r#"<article class="product_pod"></article>"#);
        assert_eq!(books.len(), 1);
        let book = &books[0];
        assert_eq!(book.title, None);
        assert_eq!(book.price, None);
        assert_eq!(book.price_float, None);
        assert_eq!(book.rating, None);
        assert!(!book.in_stock);
    }

    #[test]
    fn garbage_page_parses_to_empty_batch() {
        let site = BooksSite::new("books_1");
        assert!(site.parse_page("not html at all {{{").is_empty());
    }

    #[test]
    fn price_coercion() {
        assert_eq!(parse_price("£51.77"), Some(51.77));
        assert_eq!(parse_price("$ 12"), Some(12.0));
        assert_eq!(parse_price("N/A"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn page_url_template() {
        let site = BooksSite::new("mystery_3");
        assert_eq!(
            site.page_url(2),
            "https://books.toscrape.com/catalogue/category/mystery_3/page-2.html"
        );
    }
}
