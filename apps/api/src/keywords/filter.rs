//! Keyword filter — the thresholds a keyword must clear to be worth an anchor.

use crate::seo_client::KeywordRecord;

/// Minimum monthly search volume (inclusive).
pub const MIN_VOLUME: f64 = 50.0;
/// Difficulty ceiling (exclusive).
pub const MAX_DIFFICULTY: f64 = 50.0;

/// `volume >= 50 AND difficulty < 50 AND keyword contains topic (case-insensitive)`.
///
/// A blank topic means no topic restriction.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    topic: Option<String>,
}

impl KeywordFilter {
    pub fn new(topic: Option<&str>) -> Self {
        Self {
            topic: topic
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_lowercase),
        }
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// Topic containment only. Used when the vendor gives no metrics.
    pub fn matches_topic(&self, keyword: &str) -> bool {
        match &self.topic {
            Some(topic) => keyword.to_lowercase().contains(topic.as_str()),
            None => true,
        }
    }

    pub fn matches(&self, record: &KeywordRecord) -> bool {
        let volume_ok = record.volume.is_some_and(|v| v >= MIN_VOLUME);
        let difficulty_ok = record.difficulty.is_some_and(|d| d < MAX_DIFFICULTY);
        volume_ok && difficulty_ok && self.matches_topic(&record.keyword)
    }

    /// Keeps matching records, preserving order.
    pub fn apply(&self, records: Vec<KeywordRecord>) -> Vec<KeywordRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
