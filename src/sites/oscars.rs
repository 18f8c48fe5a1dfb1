use serde::Deserialize;
use tracing::warn;

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::export::{export, ExportBlob, Format};
use crate::fetch::Fetcher;
use crate::paginate::{self, CancelFlag, Scrape, Site};
use crate::record::Film;

const BASE_URL: &str = "https://www.scrapethissite.com";

/// Ceremony years the AJAX endpoint serves. Closed set; anything else
/// is rejected before a request goes out.
pub const AVAILABLE_YEARS: &[u16] = &[2010, 2011, 2012, 2013, 2014, 2015];

/// Raw object shape of the AJAX response. Counts default to zero and
/// flags to false when the endpoint omits them.
#[derive(Debug, Deserialize)]
struct RawFilm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    year: u16,
    #[serde(default)]
    awards: u32,
    #[serde(default)]
    nominations: u32,
    #[serde(default)]
    best_picture: bool,
}

impl RawFilm {
    fn normalize(self) -> Film {
        Film {
            title: self.title.trim().to_string(),
            year: self.year,
            awards: self.awards,
            nominations: self.nominations,
            best_picture: self.best_picture,
        }
    }
}

/// Oscar film site: one JSON page per ceremony year, driven through the
/// shared page loop by mapping page numbers onto the year list.
#[derive(Debug)]
pub struct OscarsSite {
    base: String,
    years: Vec<u16>,
}

impl OscarsSite {
    pub fn new(year: Option<u16>) -> Result<Self, ScrapeError> {
        Self::with_base(BASE_URL, year)
    }

    pub fn with_base(base: &str, year: Option<u16>) -> Result<Self, ScrapeError> {
        let years = match year {
            Some(y) if !AVAILABLE_YEARS.contains(&y) => {
                return Err(ScrapeError::UnsupportedYear {
                    year: y,
                    available: AVAILABLE_YEARS
                        .iter()
                        .map(u16::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
            Some(y) => vec![y],
            None => AVAILABLE_YEARS.to_vec(),
        };
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            years,
        })
    }

    fn year_for(&self, page: u32) -> u16 {
        self.years[(page as usize - 1).min(self.years.len() - 1)]
    }
}

impl Site for OscarsSite {
    type Record = Film;

    fn page_url(&self, page: u32) -> String {
        format!(
            "{}/pages/ajax-javascript/?ajax=true&year={}",
            self.base,
            self.year_for(page)
        )
    }

    fn parse_page(&self, body: &str) -> Vec<Film> {
        let raw: Vec<RawFilm> = match serde_json::from_str(body) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Unparseable film payload: {}", e);
                return Vec::new();
            }
        };
        raw.into_iter().map(RawFilm::normalize).collect()
    }

    fn has_next(&self, page: u32, _body: &str) -> bool {
        (page as usize) < self.years.len()
    }
}

/// Scrape films for one ceremony year, or all of them.
pub async fn scrape(
    config: &ScrapeConfig,
    year: Option<u16>,
) -> Result<Scrape<Film>, ScrapeError> {
    scrape_at(config, BASE_URL, year).await
}

pub async fn scrape_at(
    config: &ScrapeConfig,
    base: &str,
    year: Option<u16>,
) -> Result<Scrape<Film>, ScrapeError> {
    let site = OscarsSite::with_base(base, year)?;
    let fetcher = Fetcher::new(config)?;
    Ok(paginate::collect(&fetcher, &site, None, &CancelFlag::new()).await)
}

/// Fetch + export in one call.
pub async fn get(
    config: &ScrapeConfig,
    year: Option<u16>,
    format: Format,
) -> Result<ExportBlob, ScrapeError> {
    let scrape = scrape(config, year).await?;
    Ok(export(&scrape.records, format)?)
}
