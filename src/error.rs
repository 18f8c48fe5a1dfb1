use thiserror::Error;

/// Failure of a single fetch attempt, before any retry bookkeeping.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} for {url}")]
    HttpStatus { url: String, status: u16 },
}

/// Pipeline-boundary errors. Fetch failures are recovered inside the
/// paginator and only reach the caller wrapped in the shortened result;
/// everything else here propagates as-is.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("fetch failed after {attempts} attempts: {source}")]
    FetchFailed {
        attempts: u32,
        #[source]
        source: FetchError,
    },

    #[error("unknown category {input:?}; valid names include: {hint}")]
    UnknownCategory { input: String, hint: String },

    #[error("unsupported year {year}; available: {available}")]
    UnsupportedYear { year: u16, available: String },

    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unsupported output format {0:?} (expected json, csv or xlsx)")]
    UnknownFormat(String),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX serialization failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
