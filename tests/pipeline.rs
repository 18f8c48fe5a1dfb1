//! End-to-end pipeline tests against a local mock site.

use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use toscrape::config::ScrapeConfig;
use toscrape::fetch::Fetcher;
use toscrape::paginate::{collect, CancelFlag, StopReason};
use toscrape::sites::books::{self, BooksSite};
use toscrape::sites::oscars;
use toscrape::sites::quotes;

/// Test config: no inter-page delay, millisecond backoff, fixed identity.
fn test_config(max_retries: u32) -> ScrapeConfig {
    ScrapeConfig {
        delay: Duration::ZERO,
        max_retries,
        backoff_floor: Duration::from_millis(1),
        backoff_ceiling: Duration::from_millis(2),
        rotate_user_agent: false,
        ..ScrapeConfig::default()
    }
}

fn book_article(title: &str, price: &str) -> String {
    format!(
        r#"<article class="product_pod">
            <p class="star-rating Three"></p>
            <h3><a href="{0}/index.html" title="{0}">{0}</a></h3>
            <p class="price_color">{1}</p>
            <p class="instock availability">In stock</p>
        </article>"#,
        title, price
    )
}

fn book_page(count: usize, prefix: &str) -> String {
    let articles: String = (0..count)
        .map(|i| book_article(&format!("{}-{}", prefix, i), "£10.00"))
        .collect();
    format!("<html><body>{}</body></html>", articles)
}

#[tokio::test]
async fn empty_page_ends_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalogue/category/books_1/page-1.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(book_page(20, "p1")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/catalogue/category/books_1/page-2.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(book_page(0, "p2")))
        .mount(&server)
        .await;

    let scrape = books::scrape_at(&test_config(1), &server.uri(), None, None)
        .await
        .unwrap();

    assert_eq!(scrape.records.len(), 20);
    assert_eq!(scrape.pages, 1);
    assert_eq!(scrape.stop, StopReason::EmptyPage);
}

#[tokio::test]
async fn not_found_ends_pagination_with_prior_pages_intact() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalogue/category/travel_2/page-1.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(book_page(5, "p1")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/catalogue/category/travel_2/page-2.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(book_page(3, "p2")))
        .mount(&server)
        .await;
    // Page 3 is a 404: expected end-of-pagination signal

    let scrape = books::scrape_at(&test_config(1), &server.uri(), Some("travel"), None)
        .await
        .unwrap();

    assert_eq!(scrape.records.len(), 8);
    assert_eq!(scrape.pages, 2);
    assert_eq!(scrape.stop, StopReason::FetchError);

    // Page-then-in-page order is preserved
    assert_eq!(scrape.records[0].title.as_deref(), Some("p1-0"));
    assert_eq!(scrape.records[5].title.as_deref(), Some("p2-0"));
}

#[tokio::test]
async fn page_limit_stops_even_when_more_pages_exist() {
    let server = MockServer::start().await;
    for page in 1..=5 {
        Mock::given(method("GET"))
            .and(path(format!("/catalogue/category/books_1/page-{page}.html")))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(book_page(4, &format!("p{page}"))),
            )
            .mount(&server)
            .await;
    }

    let scrape = books::scrape_at(&test_config(1), &server.uri(), None, Some(2))
        .await
        .unwrap();

    assert_eq!(scrape.records.len(), 8);
    assert_eq!(scrape.pages, 2);
    assert_eq!(scrape.stop, StopReason::PageLimit);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn hard_ceiling_stops_an_endless_site() {
    let server = MockServer::start().await;
    // Every page is non-empty and never 404s: only the safety ceiling
    // can end this run
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(book_page(1, "p")))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&test_config(1)).unwrap();
    let site = BooksSite::with_base(&server.uri(), "books_1");
    let scrape = collect(&fetcher, &site, None, &CancelFlag::new()).await;

    assert_eq!(scrape.stop, StopReason::PageLimit);
    assert_eq!(scrape.pages, 100);
    assert_eq!(scrape.records.len(), 100);
    assert_eq!(server.received_requests().await.unwrap().len(), 100);
}

#[tokio::test]
async fn transient_failures_are_retried_before_giving_up() {
    let server = MockServer::start().await;
    // Always 500: three attempts, then pagination ends with nothing
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&test_config(3)).unwrap();
    let site = BooksSite::with_base(&server.uri(), "books_1");
    let scrape = collect(&fetcher, &site, None, &CancelFlag::new()).await;

    assert!(scrape.records.is_empty());
    assert_eq!(scrape.stop, StopReason::FetchError);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn missing_next_link_stops_quotes() {
    let quote = r#"<div class="quote"><span class="text">“Ok.”</span></div>"#;
    let with_next = format!(
        r#"<html><body>{}<ul class="pager"><li class="next"><a href="/page/2/">Next</a></li></ul></body></html>"#,
        quote
    );
    let without_next = format!("<html><body>{}</body></html>", quote);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(with_next))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page/2/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(without_next))
        .mount(&server)
        .await;

    let scrape = quotes::scrape_at(&test_config(1), &server.uri(), None, None)
        .await
        .unwrap();

    assert_eq!(scrape.records.len(), 2);
    assert_eq!(scrape.pages, 2);
    assert_eq!(scrape.stop, StopReason::NoNextPage);
}

#[tokio::test]
async fn tag_filter_hits_tag_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tag/love/page/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><div class="quote"><span class="text">“Love.”</span></div></body></html>"#,
        ))
        .mount(&server)
        .await;

    let scrape = quotes::scrape_at(&test_config(1), &server.uri(), Some("Love"), None)
        .await
        .unwrap();

    assert_eq!(scrape.records.len(), 1);
    assert_eq!(scrape.stop, StopReason::NoNextPage);
}

#[tokio::test]
async fn unsupported_year_fails_before_any_request() {
    let server = MockServer::start().await;

    let err = oscars::scrape_at(&test_config(1), &server.uri(), Some(2016))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("2016"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn all_years_are_walked_in_order() {
    let server = MockServer::start().await;
    for year in [2010u16, 2011, 2012, 2013, 2014, 2015] {
        Mock::given(method("GET"))
            .and(path("/pages/ajax-javascript/"))
            .and(query_param("year", year.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"[{{"title": "Film {0}", "year": {0}, "awards": 1, "nominations": 2}}]"#,
                year
            )))
            .mount(&server)
            .await;
    }

    let scrape = oscars::scrape_at(&test_config(1), &server.uri(), None)
        .await
        .unwrap();

    assert_eq!(scrape.records.len(), 6);
    assert_eq!(scrape.stop, StopReason::NoNextPage);
    let years: Vec<u16> = scrape.records.iter().map(|f| f.year).collect();
    assert_eq!(years, vec![2010, 2011, 2012, 2013, 2014, 2015]);
}

#[tokio::test]
async fn unknown_category_fails_before_any_request() {
    let server = MockServer::start().await;

    let err = books::scrape_at(&test_config(1), &server.uri(), Some("astrology"), None)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("astrology"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn cancel_flag_returns_accumulated_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(book_page(2, "p")))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&test_config(1)).unwrap();
    let site = BooksSite::with_base(&server.uri(), "books_1");

    let cancel = CancelFlag::new();
    cancel.cancel();
    let scrape = collect(&fetcher, &site, None, &cancel).await;

    assert!(scrape.records.is_empty());
    assert_eq!(scrape.stop, StopReason::Cancelled);
    assert!(server.received_requests().await.unwrap().is_empty());
}
