use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::keywords::refiner::KeywordRefiner;
use crate::llm_client::LlmClient;
use crate::seo_client::SeoClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Keyword refinement over a pluggable `KeywordSource`. Default: Site Explorer.
    pub refiner: KeywordRefiner,
    pub llm: LlmClient,
}

impl AppState {
    /// Wires both vendor clients over one shared HTTP connection pool.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let seo = SeoClient::new(http.clone(), config);
        let refiner = KeywordRefiner::new(Arc::new(seo), config.fallback_strategy);
        let llm = LlmClient::new(http, config);

        Ok(AppState { refiner, llm })
    }
}
