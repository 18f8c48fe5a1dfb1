use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use toscrape::config::ScrapeConfig;
use toscrape::export::{ExportBlob, Format, Payload};
use toscrape::sites::{books, oscars, quotes};

#[derive(Parser)]
#[command(
    name = "toscrape",
    about = "Scrape books, quotes and Oscar films from the toscrape demo sites"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: json, csv or xlsx
    #[arg(short, long, global = true, default_value = "json")]
    format: String,

    /// Write to a file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Books from books.toscrape.com
    Books {
        /// Category name or slug (e.g. "mystery" or "mystery_3").
        /// Default: all books.
        category: Option<String>,
        /// Max pages to fetch (default: until the site runs out)
        #[arg(short = 'n', long)]
        pages: Option<u32>,
    },
    /// Quotes from quotes.toscrape.com
    Quotes {
        /// Tag to filter by (e.g. "love"). Default: all quotes.
        tag: Option<String>,
        /// Max pages to fetch (default: until the site runs out)
        #[arg(short = 'n', long)]
        pages: Option<u32>,
    },
    /// Oscar films from scrapethissite.com
    Oscars {
        /// Ceremony year (2010-2015). Default: all years.
        year: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let format: Format = cli.format.parse()?;
    let config = ScrapeConfig::from_env();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(120));

    let (blob, stem) = match &cli.command {
        Commands::Books { category, pages } => {
            spinner.set_message("Scraping books...");
            let blob = books::get(&config, category.as_deref(), *pages, format).await?;
            (blob, "books")
        }
        Commands::Quotes { tag, pages } => {
            spinner.set_message("Scraping quotes...");
            let blob = quotes::get(&config, tag.as_deref(), *pages, format).await?;
            (blob, "quotes")
        }
        Commands::Oscars { year } => {
            spinner.set_message("Scraping films...");
            let blob = oscars::get(&config, *year, format).await?;
            (blob, "oscars")
        }
    };
    spinner.finish_and_clear();

    write_output(&blob, stem, cli.output)?;

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("Done in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}

/// Text goes to stdout unless a path was given; binary always goes to a
/// file, defaulting to <stem>.<ext> in the working directory.
fn write_output(blob: &ExportBlob, stem: &str, output: Option<PathBuf>) -> Result<()> {
    match (&blob.payload, output) {
        (Payload::Text(text), None) => {
            println!("{}", text);
        }
        (_, Some(path)) => {
            std::fs::write(&path, blob.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Saved {}", path.display());
        }
        (Payload::Binary(_), None) => {
            let path = PathBuf::from(format!("{}.{}", stem, blob.extension));
            std::fs::write(&path, blob.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Saved {}", path.display());
        }
    }
    Ok(())
}
