//! SEO client — the only module that talks to the Ahrefs Site Explorer API.
//!
//! Two lookups are exposed: organic keywords ranking for a URL and the top
//! pages of a site. Both share bearer authentication and the configured
//! market. The as-of date is supplied per request.
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::Config;

pub mod models;

pub use models::{KeywordRecord, TopPage};
use models::{parse_list, KEYWORD_LIST_FIELDS, PAGE_LIST_FIELDS};

const ORGANIC_KEYWORDS_PATH: &str = "/site-explorer/organic-keywords";
const TOP_PAGES_PATH: &str = "/site-explorer/top-pages";
const KEYWORD_FIELDS: &str = "keyword,volume,keyword_difficulty";
const TOP_PAGE_FIELDS: &str = "url,top_keyword";

#[derive(Debug, Error)]
pub enum SeoError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SEO API error (status {status}) for {url}: {body}")]
    Upstream { status: u16, url: String, body: String },

    #[error("SEO API returned an unreadable body from {url}: {source}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of keyword metrics. `SeoClient` is the production backend.
///
/// Carried in `AppState` as `Arc<dyn KeywordSource>`.
#[async_trait]
pub trait KeywordSource: Send + Sync {
    /// Organic keywords `target` ranks for, as of `as_of`.
    async fn organic_keywords(
        &self,
        target: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<KeywordRecord>, SeoError>;

    /// Top-ranking pages of `target`, as of `as_of`.
    async fn top_pages(&self, target: &str, as_of: NaiveDate) -> Result<Vec<TopPage>, SeoError>;
}

#[derive(Clone)]
pub struct SeoClient {
    client: Client,
    api_key: String,
    base_url: String,
    country: String,
    keyword_limit: u32,
    top_pages_limit: u32,
}

impl SeoClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            api_key: config.ahrefs_api_key.clone(),
            base_url: config.ahrefs_api_base.clone(),
            country: config.country.clone(),
            keyword_limit: config.keyword_limit,
            top_pages_limit: config.top_pages_limit,
        }
    }

    /// GETs `path` and returns the record list found under the first of `fields`.
    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        fields: &[&str],
    ) -> Result<Vec<T>, SeoError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header("accept", "application/json, application/xml")
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let url = response.url().to_string();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), %url, %body, "SEO API request failed");
            return Err(SeoError::Upstream {
                status: status.as_u16(),
                url,
                body,
            });
        }

        let body = response.text().await?;
        debug!(%url, bytes = body.len(), "SEO API response received");

        parse_list(&body, fields).map_err(|source| SeoError::Malformed { url, source })
    }
}

#[async_trait]
impl KeywordSource for SeoClient {
    async fn organic_keywords(
        &self,
        target: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<KeywordRecord>, SeoError> {
        let params = [
            ("target", target.to_string()),
            ("country", self.country.clone()),
            ("limit", self.keyword_limit.to_string()),
            ("select", KEYWORD_FIELDS.to_string()),
            ("date", format_as_of(as_of)),
        ];
        self.get_list(ORGANIC_KEYWORDS_PATH, &params, KEYWORD_LIST_FIELDS)
            .await
    }

    async fn top_pages(&self, target: &str, as_of: NaiveDate) -> Result<Vec<TopPage>, SeoError> {
        let params = [
            ("target", target.to_string()),
            ("country", self.country.clone()),
            ("limit", self.top_pages_limit.to_string()),
            ("select", TOP_PAGE_FIELDS.to_string()),
            ("date", format_as_of(as_of)),
        ];
        self.get_list(TOP_PAGES_PATH, &params, PAGE_LIST_FIELDS)
            .await
    }
}

/// `YYYY-MM-DD`, the date format Site Explorer expects.
pub fn format_as_of(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
