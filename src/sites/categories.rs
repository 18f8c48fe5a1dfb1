use crate::error::ScrapeError;

/// Slug used when no category is requested: the site's "all books" listing.
pub const DEFAULT_SLUG: &str = "books_1";

/// Human category name → site slug, as published by books.toscrape.com.
/// The numeric suffix is the site's own category id and is not derivable
/// from the name.
const CATEGORIES: &[(&str, &str)] = &[
    ("all", DEFAULT_SLUG),
    ("travel", "travel_2"),
    ("mystery", "mystery_3"),
    ("historical fiction", "historical-fiction_4"),
    ("sequential art", "sequential-art_5"),
    ("classics", "classics_6"),
    ("philosophy", "philosophy_7"),
    ("romance", "romance_8"),
    ("fiction", "fiction_10"),
    ("childrens", "childrens_11"),
    ("religion", "religion_12"),
    ("nonfiction", "nonfiction_13"),
    ("music", "music_14"),
    ("science fiction", "science-fiction_16"),
    ("sports and games", "sports-and-games_17"),
    ("fantasy", "fantasy_19"),
    ("new adult", "new-adult_20"),
    ("young adult", "young-adult_21"),
    ("science", "science_22"),
    ("poetry", "poetry_23"),
    ("paranormal", "paranormal_24"),
    ("art", "art_25"),
    ("psychology", "psychology_26"),
    ("autobiography", "autobiography_27"),
    ("parenting", "parenting_28"),
    ("adult fiction", "adult-fiction_29"),
    ("humor", "humor_30"),
    ("horror", "horror_31"),
    ("history", "history_32"),
    ("food and drink", "food-and-drink_33"),
    ("christian fiction", "christian-fiction_34"),
    ("business", "business_35"),
    ("biography", "biography_36"),
    ("thriller", "thriller_37"),
    ("contemporary", "contemporary_38"),
    ("spirituality", "spirituality_39"),
    ("academic", "academic_40"),
    ("self help", "self-help_41"),
    ("historical", "historical_42"),
    ("christian", "christian_43"),
    ("suspense", "suspense_44"),
    ("short stories", "short-stories_45"),
    ("novels", "novels_46"),
    ("health", "health_47"),
    ("politics", "politics_48"),
    ("cultural", "cultural_49"),
    ("erotica", "erotica_50"),
    ("crime", "crime_51"),
];

/// Resolve a human category name or an already-valid slug to the site
/// slug. Pure: no network, no state.
///
/// Empty or absent input resolves to the "all books" slug. Lookup is
/// whitespace-trimmed and case-insensitive, first against names, then
/// against the slug column itself, so resolving a valid slug is
/// idempotent. Unknown input is an error, never a silent fallback.
pub fn resolve(input: Option<&str>) -> Result<&'static str, ScrapeError> {
    let raw = input.unwrap_or("").trim();
    if raw.is_empty() {
        return Ok(DEFAULT_SLUG);
    }

    let needle = raw.to_lowercase();
    for &(name, slug) in CATEGORIES {
        if name == needle {
            return Ok(slug);
        }
    }
    for &(_, slug) in CATEGORIES {
        if slug.to_lowercase() == needle {
            return Ok(slug);
        }
    }

    Err(ScrapeError::UnknownCategory {
        input: raw.to_string(),
        hint: sample_names(),
    })
}

fn sample_names() -> String {
    CATEGORIES
        .iter()
        .take(8)
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}
