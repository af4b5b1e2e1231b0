//! Search query and result data models
//!
//! Field names follow the provider's wire format so that items can be passed
//! through the proxy unchanged.

use serde::{Deserialize, Serialize};

/// Marker the provider uses for a missing poster
pub const NO_POSTER: &str = "N/A";

/// A single search request: term plus 1-indexed page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchQuery {
    pub term: String,
    pub page: u32,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>, page: u32) -> Self {
        Self {
            term: term.into(),
            page: page.max(1),
        }
    }

    /// Query for the first page
    pub fn first(term: impl Into<String>) -> Self {
        Self::new(term, 1)
    }
}

/// Kind of title reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
    Episode,
    Game,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
            MediaKind::Episode => "episode",
            MediaKind::Game => "game",
            MediaKind::Other => "other",
        };
        f.write_str(s)
    }
}

/// One entry of a search page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultItem {
    /// Stable, unique identifier
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Type")]
    pub kind: MediaKind,
    /// Poster URL or `"N/A"`
    #[serde(rename = "Poster", default = "no_poster")]
    pub poster: String,
}

fn no_poster() -> String {
    NO_POSTER.to_string()
}

impl SearchResultItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            year: String::new(),
            kind: MediaKind::Movie,
            poster: no_poster(),
        }
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }

    pub fn with_kind(mut self, kind: MediaKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_poster(mut self, poster: impl Into<String>) -> Self {
        self.poster = poster.into();
        self
    }

    /// Poster URL, if the provider has one
    pub fn poster_url(&self) -> Option<&str> {
        match self.poster.as_str() {
            "" | NO_POSTER => None,
            url => Some(url),
        }
    }
}

/// One page returned by the search endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub items: Vec<SearchResultItem>,
    /// Total number of matches, when reported
    pub total_results: Option<u64>,
}

impl SearchPage {
    pub fn new(items: Vec<SearchResultItem>) -> Self {
        Self {
            items,
            total_results: None,
        }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total_results = Some(total);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Extended fields from the detail endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Genre", default)]
    pub genre: String,
    #[serde(rename = "Director", default)]
    pub director: String,
    #[serde(rename = "Plot", default)]
    pub plot: String,
    #[serde(rename = "Title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "Runtime", default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(rename = "Actors", default, skip_serializing_if = "Option::is_none")]
    pub actors: Option<String>,
    #[serde(rename = "imdbRating", default, skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<String>,
}

impl DetailRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}
