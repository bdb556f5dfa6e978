//! Keyword Refiner — turns a target URL (and optional topic) into the keyword
//! set that anchor suggestions are generated from.
//!
//! Flow: organic keywords for the target → filter → if nothing survives,
//! one fallback pass over the target's top pages.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{info, warn};

use crate::config::FallbackStrategy;
use crate::keywords::filter::KeywordFilter;
use crate::seo_client::{KeywordRecord, KeywordSource, SeoError, TopPage};

/// Where the refined keywords came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordOrigin {
    Organic,
    CompetitorKeywords,
    TopKeyword,
}

/// Output of a refinement pass.
#[derive(Debug, Clone)]
pub struct RefinedKeywords {
    pub keywords: Vec<KeywordRecord>,
    pub origin: KeywordOrigin,
    /// Records inspected before filtering, across every lookup made.
    pub candidates_considered: usize,
}

impl RefinedKeywords {
    pub fn keyword_texts(&self) -> Vec<String> {
        self.keywords.iter().map(|k| k.keyword.clone()).collect()
    }
}

#[derive(Clone)]
pub struct KeywordRefiner {
    source: Arc<dyn KeywordSource>,
    strategy: FallbackStrategy,
}

impl KeywordRefiner {
    pub fn new(source: Arc<dyn KeywordSource>, strategy: FallbackStrategy) -> Self {
        Self { source, strategy }
    }

    /// Refines keywords for `target_url`.
    ///
    /// A failing primary lookup is fatal. Fallback failures only shrink the result.
    pub async fn refine(
        &self,
        target_url: &str,
        topic: Option<&str>,
        as_of: NaiveDate,
    ) -> Result<RefinedKeywords, SeoError> {
        let filter = KeywordFilter::new(topic);

        let candidates = self.source.organic_keywords(target_url, as_of).await?;
        let candidates_considered = candidates.len();
        let keywords = filter.apply(candidates);

        info!(
            target_url,
            candidates = candidates_considered,
            refined = keywords.len(),
            "Organic keywords filtered"
        );

        if !keywords.is_empty() {
            return Ok(RefinedKeywords {
                keywords,
                origin: KeywordOrigin::Organic,
                candidates_considered,
            });
        }

        warn!(
            target_url,
            topic = ?filter.topic(),
            "No organic keywords met the criteria, falling back to top pages"
        );
        let mut fallback = self.fallback(target_url, &filter, as_of).await;
        fallback.candidates_considered += candidates_considered;
        Ok(fallback)
    }

    async fn fallback(
        &self,
        target_url: &str,
        filter: &KeywordFilter,
        as_of: NaiveDate,
    ) -> RefinedKeywords {
        let origin = match self.strategy {
            FallbackStrategy::CompetitorKeywords => KeywordOrigin::CompetitorKeywords,
            FallbackStrategy::TopKeyword => KeywordOrigin::TopKeyword,
        };

        let pages = match self.source.top_pages(target_url, as_of).await {
            Ok(pages) => pages,
            Err(e) => {
                warn!(target_url, error = %e, "Top pages lookup failed, no fallback keywords");
                return RefinedKeywords {
                    keywords: Vec::new(),
                    origin,
                    candidates_considered: 0,
                };
            }
        };

        let (keywords, candidates_considered) = match self.strategy {
            FallbackStrategy::CompetitorKeywords => {
                self.competitor_keywords(pages, filter, as_of).await
            }
            FallbackStrategy::TopKeyword => top_keywords(pages, filter),
        };

        info!(
            target_url,
            ?origin,
            candidates = candidates_considered,
            refined = keywords.len(),
            "Fallback keywords filtered"
        );

        RefinedKeywords {
            keywords,
            origin,
            candidates_considered,
        }
    }

    /// One organic lookup per page URL, all in flight at once. A failed
    /// lookup contributes nothing and does not cancel the others.
    async fn competitor_keywords(
        &self,
        pages: Vec<TopPage>,
        filter: &KeywordFilter,
        as_of: NaiveDate,
    ) -> (Vec<KeywordRecord>, usize) {
        let urls: Vec<String> = pages
            .into_iter()
            .filter_map(|page| page.url)
            .filter(|url| !url.trim().is_empty())
            .collect();

        let lookups = urls.iter().map(|url| async move {
            match self.source.organic_keywords(url, as_of).await {
                Ok(records) => records,
                Err(e) => {
                    warn!(url = %url, error = %e, "Competitor keyword lookup failed");
                    Vec::new()
                }
            }
        });

        let merged: Vec<KeywordRecord> = join_all(lookups).await.into_iter().flatten().collect();
        let considered = merged.len();
        (filter.apply(merged), considered)
    }
}

/// Each page's representative keyword, restricted by topic only.
fn top_keywords(pages: Vec<TopPage>, filter: &KeywordFilter) -> (Vec<KeywordRecord>, usize) {
    let candidates: Vec<String> = pages
        .into_iter()
        .filter_map(|page| page.top_keyword)
        .filter(|k| !k.trim().is_empty())
        .collect();
    let considered = candidates.len();

    let keywords = candidates
        .into_iter()
        .filter(|k| filter.matches_topic(k))
        .map(|keyword| KeywordRecord {
            keyword,
            volume: None,
            difficulty: None,
        })
        .collect();

    (keywords, considered)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// In-memory keyword source. Unknown targets answer with a 404.
    #[derive(Default)]
    struct FakeSource {
        organic: HashMap<String, Vec<KeywordRecord>>,
        pages: Option<Vec<TopPage>>,
        organic_calls: Mutex<Vec<String>>,
        top_pages_calls: AtomicUsize,
    }

    impl FakeSource {
        fn with_organic(mut self, target: &str, records: Vec<KeywordRecord>) -> Self {
            self.organic.insert(target.to_string(), records);
            self
        }

        fn with_pages(mut self, pages: Vec<TopPage>) -> Self {
            self.pages = Some(pages);
            self
        }

        fn organic_calls(&self) -> Vec<String> {
            self.organic_calls.lock().unwrap().clone()
        }
    }

    fn not_found(url: &str) -> SeoError {
        SeoError::Upstream {
            status: 404,
            url: url.to_string(),
            body: "not found".to_string(),
        }
    }

    #[async_trait]
    impl KeywordSource for FakeSource {
        async fn organic_keywords(
            &self,
            target: &str,
            _as_of: NaiveDate,
        ) -> Result<Vec<KeywordRecord>, SeoError> {
            self.organic_calls.lock().unwrap().push(target.to_string());
            self.organic.get(target).cloned().ok_or_else(|| not_found(target))
        }

        async fn top_pages(
            &self,
            target: &str,
            _as_of: NaiveDate,
        ) -> Result<Vec<TopPage>, SeoError> {
            self.top_pages_calls.fetch_add(1, Ordering::SeqCst);
            self.pages.clone().ok_or_else(|| not_found(target))
        }
    }

    fn page(url: &str) -> TopPage {
        TopPage {
            url: Some(url.to_string()),
            top_keyword: None,
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 21).unwrap()
    }

    async fn refine_with(
        source: Arc<FakeSource>,
        strategy: FallbackStrategy,
        topic: Option<&str>,
    ) -> Result<RefinedKeywords, SeoError> {
        KeywordRefiner::new(source, strategy)
            .refine("example.com", topic, as_of())
            .await
    }

    #[tokio::test]
    async fn test_organic_hit_skips_fallback() {
        let source = Arc::new(FakeSource::default().with_organic(
            "example.com",
            vec![
                KeywordRecord::new("red shoes", 200.0, 20.0),
                KeywordRecord::new("hats", 500.0, 10.0),
            ],
        ));

        let refined = refine_with(source.clone(), FallbackStrategy::CompetitorKeywords, Some("shoes"))
            .await
            .unwrap();

        assert_eq!(refined.keyword_texts(), vec!["red shoes"]);
        assert_eq!(refined.origin, KeywordOrigin::Organic);
        assert_eq!(refined.candidates_considered, 2);
        assert_eq!(source.top_pages_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_primary_failure_is_fatal() {
        let source = Arc::new(FakeSource::default().with_pages(vec![page("https://a.com")]));

        let err = refine_with(source.clone(), FallbackStrategy::CompetitorKeywords, None)
            .await
            .unwrap_err();

        assert!(matches!(err, SeoError::Upstream { status: 404, .. }));
        assert_eq!(source.top_pages_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_organic_runs_fallback_once() {
        let source = Arc::new(
            FakeSource::default()
                .with_organic("example.com", vec![KeywordRecord::new("hats", 10.0, 10.0)])
                .with_organic("https://a.com", vec![KeywordRecord::new("cheap hats", 90.0, 30.0)])
                .with_organic("https://b.com", vec![KeywordRecord::new("hard hats", 90.0, 80.0)])
                .with_pages(vec![page("https://a.com"), page("https://b.com")]),
        );

        let refined = refine_with(source.clone(), FallbackStrategy::CompetitorKeywords, None)
            .await
            .unwrap();

        assert_eq!(refined.keyword_texts(), vec!["cheap hats"]);
        assert_eq!(refined.origin, KeywordOrigin::CompetitorKeywords);
        assert_eq!(refined.candidates_considered, 3);
        assert_eq!(source.top_pages_calls.load(Ordering::SeqCst), 1);

        let mut calls = source.organic_calls();
        calls.sort();
        assert_eq!(calls, vec!["example.com", "https://a.com", "https://b.com"]);
    }

    #[tokio::test]
    async fn test_failed_competitor_lookup_degrades_to_empty() {
        let source = Arc::new(
            FakeSource::default()
                .with_organic("example.com", vec![])
                .with_organic("https://b.com", vec![KeywordRecord::new("shoe rack", 75.0, 5.0)])
                .with_pages(vec![page("https://missing.com"), page("https://b.com")]),
        );

        let refined = refine_with(source, FallbackStrategy::CompetitorKeywords, Some("shoe"))
            .await
            .unwrap();

        assert_eq!(refined.keyword_texts(), vec!["shoe rack"]);
    }

    #[tokio::test]
    async fn test_top_pages_failure_yields_empty_set() {
        let source = Arc::new(FakeSource::default().with_organic("example.com", vec![]));

        let refined = refine_with(source.clone(), FallbackStrategy::CompetitorKeywords, None)
            .await
            .unwrap();

        assert!(refined.keywords.is_empty());
        assert_eq!(source.top_pages_calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.organic_calls(), vec!["example.com"]);
    }

    #[tokio::test]
    async fn test_pages_without_urls_are_skipped() {
        let source = Arc::new(
            FakeSource::default()
                .with_organic("example.com", vec![])
                .with_pages(vec![TopPage::default(), page("  ")]),
        );

        let refined = refine_with(source.clone(), FallbackStrategy::CompetitorKeywords, None)
            .await
            .unwrap();

        assert!(refined.keywords.is_empty());
        assert_eq!(source.organic_calls(), vec!["example.com"]);
    }

    #[tokio::test]
    async fn test_top_keyword_strategy_filters_by_topic_only() {
        let source = Arc::new(
            FakeSource::default()
                .with_organic("example.com", vec![])
                .with_pages(vec![
                    TopPage {
                        url: Some("https://example.com/a".to_string()),
                        top_keyword: Some("Trail Shoes".to_string()),
                    },
                    TopPage {
                        url: None,
                        top_keyword: Some("rain jackets".to_string()),
                    },
                    TopPage::default(),
                ]),
        );

        let refined = refine_with(source.clone(), FallbackStrategy::TopKeyword, Some("shoes"))
            .await
            .unwrap();

        assert_eq!(refined.keyword_texts(), vec!["Trail Shoes"]);
        assert_eq!(refined.origin, KeywordOrigin::TopKeyword);
        assert_eq!(refined.keywords[0].volume, None);
        // top-keyword strategy never fans out
        assert_eq!(source.organic_calls(), vec!["example.com"]);
    }
}
