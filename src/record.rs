use serde::{Deserialize, Serialize};

/// One tabular cell after list-flattening. CSV renders it as text, XLSX
/// keeps the native type.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Float(f64),
    Int(i64),
    Bool(bool),
    Null,
}

impl Cell {
    /// CSV rendering. Null becomes an empty field.
    pub fn to_csv_field(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Float(v) => v.to_string(),
            Cell::Int(v) => v.to_string(),
            Cell::Bool(v) => v.to_string(),
            Cell::Null => String::new(),
        }
    }
}

/// A canonical record: fixed field set per entity kind, declared in
/// output column order. `row` must flatten sequence fields (tags) to a
/// single delimited string so CSV/XLSX never see nested values.
pub trait Record: Serialize {
    const FIELDS: &'static [&'static str];

    fn row(&self) -> Vec<Cell>;
}

/// Book listing entry from books.toscrape.com.
///
/// Optional fields stay present as null in JSON output; every book has
/// the same key set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: Option<String>,
    pub price: Option<String>,
    pub price_float: Option<f64>,
    pub rating: Option<u8>,
    pub in_stock: bool,
    pub url: Option<String>,
}

impl Record for Book {
    const FIELDS: &'static [&'static str] =
        &["title", "price", "price_float", "rating", "in_stock", "url"];

    fn row(&self) -> Vec<Cell> {
        vec![
            opt_text(&self.title),
            opt_text(&self.price),
            self.price_float.map(Cell::Float).unwrap_or(Cell::Null),
            self.rating.map(|r| Cell::Int(r as i64)).unwrap_or(Cell::Null),
            Cell::Bool(self.in_stock),
            opt_text(&self.url),
        ]
    }
}

/// Quote from quotes.toscrape.com. Tags keep document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub text: Option<String>,
    pub author: Option<String>,
    pub author_url: Option<String>,
    pub tags: Vec<String>,
}

impl Record for Quote {
    const FIELDS: &'static [&'static str] = &["text", "author", "author_url", "tags"];

    fn row(&self) -> Vec<Cell> {
        vec![
            opt_text(&self.text),
            opt_text(&self.author),
            opt_text(&self.author_url),
            Cell::Text(self.tags.join(", ")),
        ]
    }
}

/// Oscar film entry from the scrapethissite AJAX endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    pub title: String,
    pub year: u16,
    pub awards: u32,
    pub nominations: u32,
    pub best_picture: bool,
}

impl Record for Film {
    const FIELDS: &'static [&'static str] =
        &["title", "year", "awards", "nominations", "best_picture"];

    fn row(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.title.clone()),
            Cell::Int(self.year as i64),
            Cell::Int(self.awards as i64),
            Cell::Int(self.nominations as i64),
            Cell::Bool(self.best_picture),
        ]
    }
}

fn opt_text(value: &Option<String>) -> Cell {
    match value {
        Some(s) => Cell::Text(s.clone()),
        None => Cell::Null,
    }
}
