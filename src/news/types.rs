use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::shared::{parse_ranged, AppError, Validator};

pub const DEFAULT_LANGUAGE: &str = "pt";

/// Result ordering accepted by the news API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, Display)]
pub enum SortBy {
    #[default]
    #[strum(serialize = "publishedAt")]
    PublishedAt,
    #[strum(serialize = "relevancy")]
    Relevancy,
    #[strum(serialize = "popularity")]
    Popularity,
}

/// Raw query string of GET /api/news
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsQueryParams {
    pub q: Option<String>,
    pub language: Option<String>,
    pub from: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

/// A validated search, ready to forward upstream
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NewsSearch {
    pub q: String,
    pub language: String,
    pub from: Option<String>,
    pub sort_by: SortBy,
    pub page: i64,
    pub page_size: i64,
}

impl NewsSearch {
    /// Query pairs in the news API's parameter names, without the API key
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("q", self.q.clone()),
            ("language", self.language.clone()),
        ];
        if let Some(from) = &self.from {
            pairs.push(("from", from.clone()));
        }
        pairs.push(("sortBy", self.sort_by.to_string()));
        pairs.push(("page", self.page.to_string()));
        pairs.push(("pageSize", self.page_size.to_string()));
        pairs
    }
}

fn is_iso8601(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

impl NewsQueryParams {
    pub fn validate(&self) -> Result<NewsSearch, AppError> {
        let mut validator = Validator::new();

        let q = self.q.clone().unwrap_or_default();
        validator.check(q.chars().count() >= 2, "q", "q must be at least 2 characters");

        let language = self
            .language
            .clone()
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        validator.check(
            (2..=5).contains(&language.chars().count()),
            "language",
            "language must be between 2 and 5 characters",
        );

        if let Some(from) = &self.from {
            validator.check(is_iso8601(from), "from", "from must be an ISO-8601 date");
        }

        let sort_by = match self.sort_by.as_deref() {
            None => SortBy::default(),
            Some(raw) => raw.parse::<SortBy>().unwrap_or_else(|_| {
                validator.push("sortBy", "sortBy must be one of publishedAt, relevancy, popularity");
                SortBy::default()
            }),
        };

        let page = parse_ranged(&mut validator, "page", self.page.as_deref(), 1, 1, i64::MAX);
        let page_size = parse_ranged(
            &mut validator,
            "pageSize",
            self.page_size.as_deref(),
            10,
            5,
            100,
        );

        validator.finish()?;

        Ok(NewsSearch {
            q,
            language,
            from: self.from.clone(),
            sort_by,
            page,
            page_size,
        })
    }
}

/// Body relayed to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsResponse {
    pub status: String,
    #[serde(rename = "totalResults")]
    pub total_results: u64,
    pub articles: Vec<serde_json::Value>,
}
