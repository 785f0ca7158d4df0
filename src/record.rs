//! Dataset row schema and its normalization into [`PaperRecord`]s.
//!
//! CSV exports from the different dataset sources disagree on column names
//! (`authors` vs `author_name`, `citationCount` vs `n_citation`, ...). The raw
//! row accepts all of them; normalization happens here, once, before any row
//! reaches the aggregation code.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::parser::{coerce_count, normalize_venue, parse_author_list, split_keywords};

/// One row of a paper CSV file, as written by the dataset exporters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPaperRow {
    #[serde(alias = "paper_id", alias = "paperId")]
    pub id: Option<String>,
    pub title: Option<String>,
    #[serde(alias = "author_name")]
    pub authors: Option<String>,
    #[serde(rename = "citationCount", alias = "n_citation")]
    pub citation_count: Option<String>,
    #[serde(alias = "venue_name")]
    pub venue: Option<String>,
    pub venue_type: Option<String>,
    pub year: Option<String>,
    pub url: Option<String>,
    pub doi: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(alias = "keywords")]
    pub keyword: Option<String>,
}

/// A normalized, immutable paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
    /// Author field exactly as found in the dataset; see [`PaperRecord::authors`].
    pub authors_raw: String,
    /// `None` when the paper is excluded from venue aggregation.
    pub venue: Option<String>,
    pub citation_count: u64,
    pub url: Option<String>,
    pub doi: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub keywords: Vec<String>,
}

impl PaperRecord {
    /// Minimal constructor, mostly useful for building fixtures.
    pub fn new(id: impl Into<String>, authors_raw: impl Into<String>, citation_count: u64) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            year: None,
            authors_raw: authors_raw.into(),
            venue: None,
            citation_count,
            url: None,
            doi: None,
            abstract_text: None,
            keywords: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_venue(mut self, venue: &str) -> Self {
        self.venue = normalize_venue(venue);
        self
    }

    pub fn with_abstract(mut self, text: impl Into<String>) -> Self {
        self.abstract_text = non_empty(Some(text.into()));
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_keywords(mut self, keywords: &str) -> Self {
        self.keywords = split_keywords(keywords);
        self
    }

    /// Parsed author list.
    pub fn authors(&self) -> Vec<String> {
        parse_author_list(&self.authors_raw)
    }
}

impl RawPaperRow {
    /// Normalizes a row.
    ///
    /// `fallback_id` is used when the row carries no id, `fallback_year` when
    /// the row carries no parseable year (yearly files are named `2019.csv`).
    pub fn normalize(self, fallback_id: String, fallback_year: Option<i32>) -> PaperRecord {
        let authors_raw = self.authors.unwrap_or_default();
        if !authors_raw.trim().is_empty() && parse_author_list(&authors_raw).is_empty() {
            warn!("Paper {fallback_id}: no authors could be parsed from {authors_raw:?}");
        }

        let is_book = self
            .venue_type
            .as_deref()
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("book"));
        let venue = if is_book {
            None
        } else {
            self.venue.as_deref().and_then(normalize_venue)
        };

        let year = self
            .year
            .as_deref()
            .and_then(parse_year)
            .or(fallback_year);

        PaperRecord {
            id: non_empty(self.id).unwrap_or(fallback_id),
            title: self.title.map(|t| t.trim().to_string()).unwrap_or_default(),
            year,
            authors_raw,
            venue,
            citation_count: self.citation_count.as_deref().map(coerce_count).unwrap_or(0),
            url: non_empty(self.url),
            doi: non_empty(self.doi),
            abstract_text: non_empty(self.abstract_text),
            keywords: self.keyword.as_deref().map(split_keywords).unwrap_or_default(),
        }
    }
}

/// Parses `"2019"` as well as `"2019.0"`, which pandas writes for year
/// columns containing gaps.
pub fn parse_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    raw.parse::<i32>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i32)
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A directed citation: `source` cites `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub source: String,
    pub target: String,
}
