use std::str::FromStr;

use anyhow::{bail, Context, Result};

const DEFAULT_AHREFS_API_BASE: &str = "https://api.ahrefs.com/v3";
const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// How the refiner recovers when the target's own organic keywords yield nothing usable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackStrategy {
    /// Look up organic keywords for every top page and re-apply the full filter.
    #[default]
    CompetitorKeywords,
    /// Use each top page's precomputed `top_keyword`, filtered by topic only.
    TopKeyword,
}

impl FromStr for FallbackStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "competitor-keywords" | "competitor_keywords" => Ok(Self::CompetitorKeywords),
            "top-keyword" | "top_keyword" => Ok(Self::TopKeyword),
            other => bail!("unknown fallback strategy '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub ahrefs_api_key: String,
    pub ahrefs_api_base: String,
    pub openai_api_key: String,
    pub openai_api_base: String,
    /// Market the keyword lookups are scoped to.
    pub country: String,
    pub keyword_limit: u32,
    pub top_pages_limit: u32,
    pub fallback_strategy: FallbackStrategy,
    pub http_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            ahrefs_api_key: require("AHREFS_API_KEY")?,
            ahrefs_api_base: trim_base(or_default("AHREFS_API_BASE", DEFAULT_AHREFS_API_BASE)),
            openai_api_key: require("OPENAI_API_KEY")?,
            openai_api_base: trim_base(or_default("OPENAI_API_BASE", DEFAULT_OPENAI_API_BASE)),
            country: or_default("AHREFS_COUNTRY", "de"),
            keyword_limit: or_default("KEYWORD_LIMIT", "100")
                .parse::<u32>()
                .context("KEYWORD_LIMIT must be a positive integer")?,
            top_pages_limit: or_default("TOP_PAGES_LIMIT", "5")
                .parse::<u32>()
                .context("TOP_PAGES_LIMIT must be a positive integer")?,
            fallback_strategy: or_default("FALLBACK_STRATEGY", "competitor-keywords")
                .parse::<FallbackStrategy>()
                .context("FALLBACK_STRATEGY must be 'competitor-keywords' or 'top-keyword'")?,
            http_timeout_secs: or_default("HTTP_TIMEOUT_SECS", "120")
                .parse::<u64>()
                .context("HTTP_TIMEOUT_SECS must be a number of seconds")?,
            port: or_default("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: or_default("RUST_LOG", "info"),
        })
    }
}

fn trim_base(base: String) -> String {
    base.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied_when_only_keys_set() {
        let config = Config::from_lookup(lookup_from(&[
            ("AHREFS_API_KEY", "ahrefs-key"),
            ("OPENAI_API_KEY", "openai-key"),
        ]))
        .unwrap();

        assert_eq!(config.ahrefs_api_base, "https://api.ahrefs.com/v3");
        assert_eq!(config.openai_api_base, "https://api.openai.com/v1");
        assert_eq!(config.country, "de");
        assert_eq!(config.keyword_limit, 100);
        assert_eq!(config.top_pages_limit, 5);
        assert_eq!(config.fallback_strategy, FallbackStrategy::CompetitorKeywords);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_missing_api_key_fails() {
        let err = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "openai-key")]))
            .unwrap_err();
        assert!(err.to_string().contains("AHREFS_API_KEY"));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let result = Config::from_lookup(lookup_from(&[
            ("AHREFS_API_KEY", "ahrefs-key"),
            ("OPENAI_API_KEY", "  "),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_and_trailing_slash() {
        let config = Config::from_lookup(lookup_from(&[
            ("AHREFS_API_KEY", "a"),
            ("OPENAI_API_KEY", "o"),
            ("AHREFS_API_BASE", "http://localhost:9000/v3/"),
            ("FALLBACK_STRATEGY", "top-keyword"),
            ("TOP_PAGES_LIMIT", "10"),
            ("PORT", "3000"),
        ]))
        .unwrap();

        assert_eq!(config.ahrefs_api_base, "http://localhost:9000/v3");
        assert_eq!(config.fallback_strategy, FallbackStrategy::TopKeyword);
        assert_eq!(config.top_pages_limit, 10);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("AHREFS_API_KEY", "a"),
            ("OPENAI_API_KEY", "o"),
            ("PORT", "not-a-port"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        assert!("scrape-everything".parse::<FallbackStrategy>().is_err());
        assert_eq!(
            "Competitor_Keywords".parse::<FallbackStrategy>().unwrap(),
            FallbackStrategy::CompetitorKeywords
        );
    }
}
